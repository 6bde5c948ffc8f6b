use crate::config::config::AppConfig;
use crate::errors::errors::RtspError;
use crate::iterator::credential_reader::{Credential, CredentialReader};
use crate::iterator::host_reader::{Host, HostReader};
use crate::iterator::route_reader::{Route, RouteReader};
use timing_macro::timing;

/// 一次运行的全部输入
#[derive(Clone, Debug)]
pub struct InputSet {
    /// 显式给出的主机列表；为 None 时需要通过主机发现获取
    pub hosts: Option<Vec<Host>>,
    pub routes: Vec<Route>,
    pub credentials: Vec<Credential>,
}

// 根据配置选择主机数据源，两者都没有时返回 None
fn host_reader(config: &AppConfig) -> Result<Option<HostReader>, RtspError> {
    match (&config.hosts_file, &config.hosts_string) {
        (Some(file), None) => Ok(Some(HostReader::from_file(file))),
        (None, Some(hosts)) => Ok(Some(HostReader::from_string(hosts))),
        (None, None) => Ok(None),
        (Some(_), Some(_)) => Err(RtspError::InvalidArgument(
            "Only one of hosts_file or hosts_string may be provided".to_string(),
        )),
    }
}

fn credential_reader(config: &AppConfig) -> Result<CredentialReader, RtspError> {
    match (
        &config.credentials_file,
        &config.users_file,
        &config.passwords_file,
    ) {
        (Some(file), None, None) => Ok(CredentialReader::from_file(file)),
        (None, Some(users), Some(passwords)) => Ok(CredentialReader::from_files(users, passwords)),
        (None, None, None) => Err(RtspError::ConfigError(
            "credentials_file (or users_file and passwords_file) is required".to_string(),
        )),
        _ => Err(RtspError::InvalidArgument(
            "Use either credentials_file or users_file with passwords_file".to_string(),
        )),
    }
}

/// 读取路由、凭据和（可选的）主机列表。
/// 任何格式或配置错误都在第一次尝试之前返回。
#[timing("load inputs")]
pub fn load_inputs(config: &AppConfig) -> Result<InputSet, RtspError> {
    let routes_file = config
        .routes_file
        .as_deref()
        .ok_or_else(|| RtspError::ConfigError("routes_file is required".to_string()))?;
    let routes = RouteReader::from_file(routes_file).read_routes()?;
    log::debug!("Loaded {} routes from {}", routes.len(), routes_file);

    let credentials = credential_reader(config)?.read_credentials()?;
    log::debug!("Loaded {} credentials", credentials.len());

    let hosts = match host_reader(config)? {
        Some(reader) => {
            let hosts = reader.read_hosts()?;
            log::debug!("Loaded {} hosts", hosts.len());
            Some(hosts)
        }
        None => None,
    };

    Ok(InputSet {
        hosts,
        routes,
        credentials,
    })
}
