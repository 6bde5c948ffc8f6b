use rstest::rstest;
use rust_rtsp_grabber::errors::ParseError;
use rust_rtsp_grabber::iterator::port_parser::{format_ports, parse_ports};

/// 测试单个端口解析
#[rstest]
#[case("554", vec![554])]
#[case(" 8554 ", vec![8554])]
#[case("65535", vec![65535])]
fn test_single_port(#[case] input: &str, #[case] expected: Vec<u16>) {
    assert_eq!(parse_ports(input).unwrap(), expected);
}

/// 测试端口列表和范围
#[rstest]
#[case("554,8554", vec![554, 8554])]
#[case("8000-8003", vec![8000, 8001, 8002, 8003])]
#[case("554,8000-8001,10554", vec![554, 8000, 8001, 10554])]
#[case("{554,8554}", vec![554, 8554])]
#[case("554, ,8554,", vec![554, 8554])]
fn test_port_list_and_range(#[case] input: &str, #[case] expected: Vec<u16>) {
    assert_eq!(parse_ports(input).unwrap(), expected);
}

/// 测试重复端口只保留第一次出现
#[rstest]
#[case("554,554", vec![554])]
#[case("8554,554-556,555", vec![8554, 554, 555, 556])]
fn test_duplicate_ports(#[case] input: &str, #[case] expected: Vec<u16>) {
    assert_eq!(parse_ports(input).unwrap(), expected);
}

/// 测试无效输入
#[rstest]
#[case("", ParseError::EmptyPortSpec)]
#[case(",", ParseError::EmptyPortSpec)]
#[case("0", ParseError::InvalidPortNumber("0".to_string()))]
#[case("65536", ParseError::InvalidPortNumber("65536".to_string()))]
#[case("rtsp", ParseError::InvalidPortNumber("rtsp".to_string()))]
#[case("8010-8000", ParseError::InvalidPortRange(8010, 8000))]
#[case("1-2-3", ParseError::InvalidPortRangeFormat("1-2-3".to_string()))]
fn test_invalid_ports(#[case] input: &str, #[case] expected: ParseError) {
    assert_eq!(parse_ports(input).unwrap_err(), expected);
}

#[test]
fn test_format_ports() {
    assert_eq!(format_ports(&[554]), "554");
    assert_eq!(format_ports(&[554, 8554, 10554]), "554,8554,10554");
    assert_eq!(format_ports(&[]), "");
}
