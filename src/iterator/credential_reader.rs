use crate::errors::errors::RtspError;
use crate::iterator::read_lines_from_file;
use std::fmt::Display;

/// 用户名/密码对，密码可以为空
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct Credential {
    pub username: String,
    pub password: String,
}

impl Credential {
    pub fn new(username: &str, password: &str) -> Self {
        Credential {
            username: username.to_string(),
            password: password.to_string(),
        }
    }

    /// 解析 `username:password`，以第一个冒号为分隔符
    pub fn parse(line: &str) -> Option<Self> {
        line.split_once(':')
            .map(|(username, password)| Credential::new(username, password))
    }

    // 空字符串表示不提供该项
    pub fn username(&self) -> Option<&str> {
        Some(self.username.as_str()).filter(|u| !u.is_empty())
    }

    pub fn password(&self) -> Option<&str> {
        Some(self.password.as_str()).filter(|p| !p.is_empty())
    }
}

impl Display for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.username, "*".repeat(self.password.len()))
    }
}

// 定义凭据数据源类型
#[derive(Clone, Debug)]
pub enum CredentialSource {
    // 每行一个 username:password
    Pairs(String),
    // 用户名文件 × 密码文件
    UsersAndPasswords { users_file: String, passwords_file: String },
}

// 凭据读取器
#[derive(Clone, Debug)]
pub struct CredentialReader {
    source: CredentialSource,
}

impl CredentialReader {
    // 从 username:password 文件创建凭据读取器
    pub fn from_file(credentials_file: &str) -> Self {
        CredentialReader {
            source: CredentialSource::Pairs(credentials_file.to_string()),
        }
    }

    // 从用户名文件和密码文件创建凭据读取器
    pub fn from_files(users_file: &str, passwords_file: &str) -> Self {
        CredentialReader {
            source: CredentialSource::UsersAndPasswords {
                users_file: users_file.to_string(),
                passwords_file: passwords_file.to_string(),
            },
        }
    }

    /// 读取凭据列表。缺少冒号的行是格式错误，空列表是配置错误。
    pub fn read_credentials(&self) -> Result<Vec<Credential>, RtspError> {
        let credentials = match &self.source {
            CredentialSource::Pairs(file_path) => read_lines_from_file(file_path)?
                .into_iter()
                .map(|(line, content)| {
                    Credential::parse(&content)
                        .ok_or(RtspError::InvalidCredential { line, content })
                })
                .collect::<Result<Vec<_>, _>>()?,
            CredentialSource::UsersAndPasswords {
                users_file,
                passwords_file,
            } => {
                let usernames = read_lines_from_file(users_file)?;
                let passwords = read_lines_from_file(passwords_file)?;
                // 用户名在外层，与每个密码组合
                usernames
                    .iter()
                    .flat_map(|(_, username)| {
                        passwords
                            .iter()
                            .map(move |(_, password)| Credential::new(username.trim(), password))
                    })
                    .collect()
            }
        };

        if credentials.is_empty() {
            return Err(RtspError::EmptyInput("credentials"));
        }
        Ok(credentials)
    }
}
