//! Redis 地址解析
//!
//! 只检查第一个地址是否携带 `password@host:port` 形式的凭证，
//! 其余地址原样使用。

/// 解析后的存储地址
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreAddresses {
    pub addrs: Vec<String>,
    pub password: Option<String>,
}

/// 从地址列表中提取凭证
///
/// 第一个地址按 `@` 切分恰好得到两段时，前一段为凭证，后一段替换原地址；
/// 其他情况（没有 `@` 或有多个 `@`）保持不变。
pub fn parse_addresses(mut addrs: Vec<String>) -> StoreAddresses {
    let mut password = None;

    if let Some(first) = addrs.first_mut() {
        let split = match first.split('@').collect::<Vec<_>>().as_slice() {
            [credential, addr] => Some((credential.to_string(), addr.to_string())),
            _ => None,
        };
        if let Some((credential, addr)) = split {
            password = Some(credential).filter(|p| !p.is_empty());
            *first = addr;
        }
    }

    StoreAddresses { addrs, password }
}

/// 构建 Redis 连接 URL
///
/// 已经是 URL 的地址（包含 `://`）原样返回。
pub fn connection_url(addr: &str, password: Option<&str>, db: Option<i64>) -> String {
    if addr.contains("://") {
        return addr.to_string();
    }

    let auth = password
        .map(|p| format!(":{}@", encode_userinfo(p)))
        .unwrap_or_default();

    match db {
        Some(db) => format!("redis://{}{}/{}", auth, addr, db),
        None => format!("redis://{}{}", auth, addr),
    }
}

/// URL userinfo 部分的百分号编码，只保留非保留字符
fn encode_userinfo(raw: &str) -> String {
    let mut encoded = String::with_capacity(raw.len());
    for byte in raw.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~' => {
                encoded.push(byte as char)
            }
            _ => encoded.push_str(&format!("%{:02X}", byte)),
        }
    }
    encoded
}
