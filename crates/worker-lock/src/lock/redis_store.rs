//! Redis 锁存储
//!
//! 按配置选择拓扑：配置了主节点名称时走哨兵发现，多个地址时走集群，
//! 否则连接单节点。构造时不产生任何网络交互，连接在每次操作时按需建立。

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::cluster::ClusterClient;
use redis::cluster_async::ClusterConnection;
use redis::{Client, Cmd, FromRedisValue};
use std::time::Duration;
use tracing::{debug, info, instrument};
use worker_lock_shared::error::{LockError, Result};

use super::address::{StoreAddresses, connection_url};
use super::store::LockStore;

enum Topology {
    Single(Client),
    Cluster(ClusterClient),
    Sentinel {
        sentinels: Vec<Client>,
        master_name: String,
        password: Option<String>,
        db: i64,
    },
}

enum StoreConnection {
    Single(MultiplexedConnection),
    Cluster(ClusterConnection),
}

impl StoreConnection {
    async fn query<T: FromRedisValue>(&mut self, cmd: &Cmd) -> redis::RedisResult<T> {
        match self {
            Self::Single(conn) => cmd.query_async(conn).await,
            Self::Cluster(conn) => cmd.query_async(conn).await,
        }
    }
}

/// Redis 锁存储
///
/// 客户端句柄可以被多个调用方并发共享。
pub struct RedisLockStore {
    topology: Topology,
}

impl RedisLockStore {
    /// 创建 Redis 锁存储
    ///
    /// # Arguments
    /// - `addresses`: 解析后的地址与凭证
    /// - `db`: 逻辑数据库编号（集群模式下忽略）
    /// - `master_name`: 哨兵模式下的主节点名称
    pub fn new(addresses: StoreAddresses, db: i64, master_name: Option<&str>) -> Result<Self> {
        let StoreAddresses { addrs, password } = addresses;
        if addrs.is_empty() {
            return Err(LockError::InvalidConfig(
                "at least one redis address is required".to_string(),
            ));
        }
        let node_count = addrs.len();

        let topology = match master_name.filter(|name| !name.is_empty()) {
            Some(master_name) => {
                let sentinels = addrs
                    .iter()
                    .map(|addr| Client::open(connection_url(addr, None, None).as_str()))
                    .collect::<redis::RedisResult<Vec<_>>>()?;
                Topology::Sentinel {
                    sentinels,
                    master_name: master_name.to_string(),
                    password,
                    db,
                }
            }
            None if node_count > 1 => {
                let nodes: Vec<String> = addrs
                    .iter()
                    .map(|addr| connection_url(addr, password.as_deref(), None))
                    .collect();
                Topology::Cluster(ClusterClient::new(nodes)?)
            }
            None => Topology::Single(Client::open(
                connection_url(&addrs[0], password.as_deref(), Some(db)).as_str(),
            )?),
        };

        let store = Self { topology };
        info!(
            topology = store.topology_name(),
            nodes = node_count,
            db,
            "Redis lock store created"
        );
        Ok(store)
    }

    /// 当前拓扑名称
    pub fn topology_name(&self) -> &'static str {
        match self.topology {
            Topology::Single(_) => "single",
            Topology::Cluster(_) => "cluster",
            Topology::Sentinel { .. } => "sentinel",
        }
    }

    async fn connection(&self) -> Result<StoreConnection> {
        match &self.topology {
            Topology::Single(client) => Ok(StoreConnection::Single(
                client.get_multiplexed_async_connection().await?,
            )),
            Topology::Cluster(client) => {
                Ok(StoreConnection::Cluster(client.get_async_connection().await?))
            }
            Topology::Sentinel {
                sentinels,
                master_name,
                password,
                db,
            } => {
                let master = resolve_master(sentinels, master_name, password.as_deref(), *db).await?;
                Ok(StoreConnection::Single(
                    master.get_multiplexed_async_connection().await?,
                ))
            }
        }
    }
}

/// 通过哨兵查询当前主节点地址
///
/// 依次询问每个哨兵，第一个给出地址的哨兵生效。
async fn resolve_master(
    sentinels: &[Client],
    master_name: &str,
    password: Option<&str>,
    db: i64,
) -> Result<Client> {
    let mut last_error = None;

    for sentinel in sentinels {
        match query_master_addr(sentinel, master_name).await {
            Ok(Some((host, port))) => {
                debug!(master = %master_name, host = %host, port = %port, "Master resolved by sentinel");
                let addr = format!("{}:{}", host, port);
                return Ok(Client::open(
                    connection_url(&addr, password, Some(db)).as_str(),
                )?);
            }
            Ok(None) => {
                debug!(master = %master_name, "Sentinel does not know master");
            }
            Err(e) => {
                debug!(master = %master_name, error = %e, "Sentinel query failed");
                last_error = Some(LockError::from(e));
            }
        }
    }

    Err(last_error.unwrap_or_else(|| {
        LockError::Store(format!("no sentinel knows master {}", master_name))
    }))
}

async fn query_master_addr(
    sentinel: &Client,
    master_name: &str,
) -> redis::RedisResult<Option<(String, String)>> {
    let mut conn = sentinel.get_multiplexed_async_connection().await?;
    redis::cmd("SENTINEL")
        .arg("get-master-addr-by-name")
        .arg(master_name)
        .query_async(&mut conn)
        .await
}

/// PX 参数的毫秒数，不足 1 毫秒的正时长按 1 毫秒计
fn px_millis(ttl: Duration) -> u64 {
    u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX).max(1)
}

#[async_trait]
impl LockStore for RedisLockStore {
    /// SET key value NX PX milliseconds
    #[instrument(skip(self))]
    async fn set_if_absent(&self, key: &str, value: i64, ttl: Duration) -> Result<bool> {
        let mut conn = self.connection().await?;

        let mut cmd = redis::cmd("SET");
        cmd.arg(key).arg(value).arg("NX").arg("PX").arg(px_millis(ttl));

        // 成功时返回 "OK"，key 已存在时返回 nil
        let result: Option<String> = conn.query(&cmd).await?;
        Ok(result.is_some())
    }

    #[instrument(skip(self))]
    async fn time_to_live(&self, key: &str) -> Result<Option<Duration>> {
        let mut conn = self.connection().await?;

        let mut cmd = redis::cmd("PTTL");
        cmd.arg(key);

        // -2: key 不存在；-1: key 没有过期时间
        let millis: i64 = conn.query(&cmd).await?;
        Ok(u64::try_from(millis).ok().map(Duration::from_millis))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lock::address::parse_addresses;

    fn addrs(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_px_millis() {
        assert_eq!(px_millis(Duration::from_secs(5)), 5000);
        assert_eq!(px_millis(Duration::from_nanos(5_000_000_001)), 5000);
        assert_eq!(px_millis(Duration::from_nanos(1)), 1);
        assert_eq!(px_millis(Duration::from_micros(999)), 1);
    }

    #[test]
    fn test_single_topology() {
        let store = RedisLockStore::new(parse_addresses(addrs(&["secret@127.0.0.1:6379"])), 1, None)
            .expect("single node client");
        assert_eq!(store.topology_name(), "single");
    }

    #[test]
    fn test_cluster_topology() {
        let store = RedisLockStore::new(
            parse_addresses(addrs(&["127.0.0.1:7000", "127.0.0.1:7001"])),
            0,
            None,
        )
        .expect("cluster client");
        assert_eq!(store.topology_name(), "cluster");
    }

    #[test]
    fn test_sentinel_topology() {
        let store = RedisLockStore::new(
            parse_addresses(addrs(&["127.0.0.1:26379", "127.0.0.1:26380"])),
            0,
            Some("mymaster"),
        )
        .expect("sentinel clients");
        assert_eq!(store.topology_name(), "sentinel");
    }

    #[test]
    fn test_empty_master_name_is_ignored() {
        let store = RedisLockStore::new(parse_addresses(addrs(&["127.0.0.1:6379"])), 0, Some(""))
            .expect("single node client");
        assert_eq!(store.topology_name(), "single");
    }

    #[test]
    fn test_empty_address_list_rejected() {
        let result = RedisLockStore::new(parse_addresses(Vec::new()), 0, None);
        assert!(matches!(result, Err(LockError::InvalidConfig(_))));
    }
}
