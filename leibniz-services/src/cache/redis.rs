//! `RedisCache` - Redis Protocol Client
//!
//! `TigerStyle`: Production client, feature-gated.
//!
//! Speaks the RESP2 wire protocol directly over a single lazily opened TCP
//! connection. Only the replies the cache surface needs are decoded: simple
//! strings, errors, integers and bulk strings.
//!
//! Requires `redis` feature flag:
//! ```toml
//! leibniz-services = { version = "0.1", features = ["redis"] }
//! ```

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufStream};
use tokio::net::TcpStream;
use tokio::sync::Mutex;

use leibniz_core::constants::CACHE_PORT_DEFAULT;

use super::CacheClient;
use crate::error::{ClientError, ClientResult};
use crate::settings::CacheOptions;

// =============================================================================
// Constants
// =============================================================================

/// URL scheme accepted by the client
const REDIS_SCHEME: &str = "redis://";

/// Largest bulk reply accepted (Redis' own proto-max-bulk-len default)
const REDIS_BULK_BYTES_MAX: usize = 512 * 1024 * 1024;

// =============================================================================
// Endpoint
// =============================================================================

/// Parsed `redis://[[user]:password@]host[:port][/db]` URL.
#[derive(Clone, PartialEq, Eq)]
struct RedisEndpoint {
    host: String,
    port: u16,
    password: Option<String>,
    db: u32,
}

impl RedisEndpoint {
    fn parse(url: &str) -> ClientResult<Self> {
        let rest = url
            .strip_prefix(REDIS_SCHEME)
            .ok_or_else(|| ClientError::invalid_config(format!("unsupported cache url: {url}")))?;

        let (authority, path) = match rest.split_once('/') {
            Some((authority, path)) => (authority, path),
            None => (rest, ""),
        };

        let (credentials, host_port) = match authority.rsplit_once('@') {
            Some((credentials, host_port)) => (Some(credentials), host_port),
            None => (None, authority),
        };

        let password = credentials
            .map(|c| c.split_once(':').map_or(c, |(_, password)| password))
            .filter(|p| !p.is_empty())
            .map(str::to_string);

        let (host, port) = match host_port.rsplit_once(':') {
            Some((host, port)) => {
                let port = port
                    .parse::<u16>()
                    .map_err(|_| ClientError::invalid_config(format!("invalid cache port: {port}")))?;
                (host, port)
            }
            None => (host_port, CACHE_PORT_DEFAULT),
        };

        if host.is_empty() {
            return Err(ClientError::invalid_config("cache url has no host"));
        }

        let db = if path.is_empty() {
            0
        } else {
            path.parse::<u32>()
                .map_err(|_| ClientError::invalid_config(format!("invalid cache db: {path}")))?
        };

        Ok(Self {
            host: host.to_string(),
            port,
            password,
            db,
        })
    }
}

impl fmt::Debug for RedisEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedisEndpoint")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .field("db", &self.db)
            .finish()
    }
}

// =============================================================================
// Wire format
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
enum Reply {
    Simple(String),
    Error(String),
    Integer(i64),
    Bulk(Option<String>),
}

async fn write_command<W>(writer: &mut W, args: &[&str]) -> ClientResult<()>
where
    W: AsyncWrite + Unpin,
{
    debug_assert!(!args.is_empty(), "command must have a name");

    let mut frame = format!("*{}\r\n", args.len()).into_bytes();
    for arg in args {
        frame.extend_from_slice(format!("${}\r\n", arg.len()).as_bytes());
        frame.extend_from_slice(arg.as_bytes());
        frame.extend_from_slice(b"\r\n");
    }

    writer.write_all(&frame).await?;
    writer.flush().await?;
    Ok(())
}

async fn read_reply<R>(reader: &mut R) -> ClientResult<Reply>
where
    R: AsyncBufRead + Unpin,
{
    let mut line = String::new();
    let read = reader.read_line(&mut line).await?;
    if read == 0 {
        return Err(ClientError::connection("connection closed by server"));
    }

    let line = line
        .strip_suffix("\r\n")
        .ok_or_else(|| ClientError::protocol("reply line not terminated by CRLF"))?;
    let mut chars = line.chars();
    let marker = chars.next();
    let body = chars.as_str();

    match marker {
        Some('+') => Ok(Reply::Simple(body.to_string())),
        Some('-') => Ok(Reply::Error(body.to_string())),
        Some(':') => body
            .parse::<i64>()
            .map(Reply::Integer)
            .map_err(|_| ClientError::protocol(format!("invalid integer reply: {body}"))),
        Some('$') => {
            let len = body
                .parse::<i64>()
                .map_err(|_| ClientError::protocol(format!("invalid bulk length: {body}")))?;
            if len < 0 {
                return Ok(Reply::Bulk(None));
            }
            let len = usize::try_from(len)
                .ok()
                .filter(|len| *len <= REDIS_BULK_BYTES_MAX)
                .ok_or_else(|| ClientError::protocol(format!("bulk reply too large: {len}")))?;

            let mut payload = vec![0u8; len + 2];
            reader.read_exact(&mut payload).await?;
            if !payload.ends_with(b"\r\n") {
                return Err(ClientError::protocol("bulk reply not terminated by CRLF"));
            }
            payload.truncate(len);

            String::from_utf8(payload)
                .map(|value| Reply::Bulk(Some(value)))
                .map_err(|_| ClientError::protocol("bulk reply is not valid UTF-8"))
        }
        other => Err(ClientError::protocol(format!(
            "unsupported reply type: {other:?}"
        ))),
    }
}

fn server_error(message: String) -> ClientError {
    if message.starts_with("NOAUTH") || message.starts_with("WRONGPASS") {
        ClientError::AuthenticationFailed
    } else {
        ClientError::protocol(format!("server error: {message}"))
    }
}

// =============================================================================
// RedisCache
// =============================================================================

type Connection = BufStream<TcpStream>;

/// Cache client for a real Redis server.
///
/// Construction only validates the URL. The connection is opened on the
/// first command and dropped after any transport failure, so the next
/// command reconnects.
pub struct RedisCache {
    endpoint: RedisEndpoint,
    timeout: Duration,
    connection: Mutex<Option<Connection>>,
}

impl RedisCache {
    /// Create a client from cache options.
    ///
    /// # Errors
    /// Returns `ClientError::InvalidConfig` for a malformed URL or zero timeout.
    pub fn new(options: &CacheOptions) -> ClientResult<Self> {
        if options.timeout_ms == 0 {
            return Err(ClientError::invalid_config("cache timeout must be positive"));
        }

        Ok(Self {
            endpoint: RedisEndpoint::parse(&options.url)?,
            timeout: Duration::from_millis(options.timeout_ms),
            connection: Mutex::new(None),
        })
    }

    async fn open(&self) -> ClientResult<Connection> {
        let stream = TcpStream::connect((self.endpoint.host.as_str(), self.endpoint.port)).await?;
        let mut connection = BufStream::new(stream);

        if let Some(password) = &self.endpoint.password {
            write_command(&mut connection, &["AUTH", password.as_str()]).await?;
            if let Reply::Error(message) = read_reply(&mut connection).await? {
                tracing::warn!(host = %self.endpoint.host, "cache authentication rejected");
                return Err(server_error(message));
            }
        }

        if self.endpoint.db != 0 {
            let db = self.endpoint.db.to_string();
            write_command(&mut connection, &["SELECT", db.as_str()]).await?;
            if let Reply::Error(message) = read_reply(&mut connection).await? {
                return Err(server_error(message));
            }
        }

        tracing::debug!(
            host = %self.endpoint.host,
            port = self.endpoint.port,
            db = self.endpoint.db,
            "cache connection opened"
        );
        Ok(connection)
    }

    async fn round_trip(&self, slot: &mut Option<Connection>, args: &[&str]) -> ClientResult<Reply> {
        if slot.is_none() {
            *slot = Some(self.open().await?);
        }
        let Some(connection) = slot.as_mut() else {
            return Err(ClientError::connection("cache connection unavailable"));
        };

        write_command(connection, args).await?;
        read_reply(connection).await
    }

    async fn command(&self, args: &[&str]) -> ClientResult<Reply> {
        let mut slot = self.connection.lock().await;

        let result = match tokio::time::timeout(self.timeout, self.round_trip(&mut slot, args)).await {
            Ok(result) => result,
            Err(_) => Err(ClientError::Timeout),
        };

        match result {
            Ok(Reply::Error(message)) => Err(server_error(message)),
            Ok(reply) => Ok(reply),
            Err(err) => {
                // Stream state is unknown after a transport failure.
                *slot = None;
                tracing::warn!(command = args[0], error = %err, "cache command failed");
                Err(err)
            }
        }
    }

    fn unexpected(command: &str, reply: &Reply) -> ClientError {
        ClientError::protocol(format!("unexpected reply to {command}: {reply:?}"))
    }
}

impl fmt::Debug for RedisCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedisCache")
            .field("endpoint", &self.endpoint)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl CacheClient for RedisCache {
    async fn get(&self, key: &str) -> ClientResult<Option<String>> {
        match self.command(&["GET", key]).await? {
            Reply::Bulk(value) => Ok(value),
            other => Err(Self::unexpected("GET", &other)),
        }
    }

    async fn set(&self, key: &str, value: &str) -> ClientResult<bool> {
        match self.command(&["SET", key, value]).await? {
            Reply::Simple(status) => Ok(status == "OK"),
            other => Err(Self::unexpected("SET", &other)),
        }
    }

    async fn setex(&self, key: &str, ttl_secs: u64, value: &str) -> ClientResult<bool> {
        // The server rejects SETEX 0; a zero TTL means "already gone".
        if ttl_secs == 0 {
            self.delete(key).await?;
            return Ok(true);
        }

        let ttl = ttl_secs.to_string();
        match self.command(&["SETEX", key, ttl.as_str(), value]).await? {
            Reply::Simple(status) => Ok(status == "OK"),
            other => Err(Self::unexpected("SETEX", &other)),
        }
    }

    async fn delete(&self, key: &str) -> ClientResult<u64> {
        match self.command(&["DEL", key]).await? {
            Reply::Integer(count) => Ok(u64::try_from(count).unwrap_or(0)),
            other => Err(Self::unexpected("DEL", &other)),
        }
    }

    async fn ping(&self) -> ClientResult<bool> {
        match self.command(&["PING"]).await? {
            Reply::Simple(pong) => Ok(pong == "PONG"),
            other => Err(Self::unexpected("PING", &other)),
        }
    }

    fn pipeline(&self) -> &dyn CacheClient {
        self
    }

    async fn execute(&self) -> ClientResult<Vec<String>> {
        Ok(Vec::new())
    }

    fn name(&self) -> &'static str {
        "redis"
    }

    fn is_simulation(&self) -> bool {
        false
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::BufReader;

    async fn parse(bytes: &[u8]) -> ClientResult<Reply> {
        let mut reader = BufReader::new(bytes);
        read_reply(&mut reader).await
    }

    #[test]
    fn test_parse_full_url() {
        let endpoint = RedisEndpoint::parse("redis://:secret@cache.internal:6380/2").unwrap();
        assert_eq!(endpoint.host, "cache.internal");
        assert_eq!(endpoint.port, 6380);
        assert_eq!(endpoint.password.as_deref(), Some("secret"));
        assert_eq!(endpoint.db, 2);
    }

    #[test]
    fn test_parse_minimal_url() {
        let endpoint = RedisEndpoint::parse("redis://localhost").unwrap();
        assert_eq!(endpoint.port, CACHE_PORT_DEFAULT);
        assert!(endpoint.password.is_none());
        assert_eq!(endpoint.db, 0);
    }

    #[test]
    fn test_parse_rejects_bad_urls() {
        assert!(RedisEndpoint::parse("http://localhost:6379").is_err());
        assert!(RedisEndpoint::parse("redis://:6379").is_err());
        assert!(RedisEndpoint::parse("redis://localhost:notaport").is_err());
        assert!(RedisEndpoint::parse("redis://localhost/abc").is_err());
    }

    #[test]
    fn test_debug_hides_password() {
        let endpoint = RedisEndpoint::parse("redis://:hunter2@localhost").unwrap();
        let rendered = format!("{endpoint:?}");
        assert!(!rendered.contains("hunter2"));
    }

    #[test]
    fn test_new_rejects_zero_timeout() {
        let options = CacheOptions {
            url: "redis://localhost:6379".to_string(),
            timeout_ms: 0,
        };
        assert!(matches!(
            RedisCache::new(&options),
            Err(ClientError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn test_new_does_not_connect() {
        let cache = RedisCache::new(&CacheOptions::default()).unwrap();
        assert_eq!(cache.name(), "redis");
        assert!(!cache.is_simulation());
    }

    #[tokio::test]
    async fn test_write_command_frame() {
        let mut out = Vec::new();
        write_command(&mut out, &["SETEX", "k", "60", "v"]).await.unwrap();
        assert_eq!(out, b"*4\r\n$5\r\nSETEX\r\n$1\r\nk\r\n$2\r\n60\r\n$1\r\nv\r\n");
    }

    #[tokio::test]
    async fn test_read_replies() {
        assert_eq!(parse(b"+OK\r\n").await.unwrap(), Reply::Simple("OK".into()));
        assert_eq!(parse(b":1\r\n").await.unwrap(), Reply::Integer(1));
        assert_eq!(parse(b"$-1\r\n").await.unwrap(), Reply::Bulk(None));
        assert_eq!(
            parse(b"$5\r\nhello\r\n").await.unwrap(),
            Reply::Bulk(Some("hello".into()))
        );
        assert_eq!(
            parse(b"-ERR wrong\r\n").await.unwrap(),
            Reply::Error("ERR wrong".into())
        );
    }

    #[tokio::test]
    async fn test_read_reply_errors() {
        assert!(matches!(
            parse(b"*1\r\n$1\r\na\r\n").await,
            Err(ClientError::Protocol { .. })
        ));
        assert!(matches!(parse(b"").await, Err(ClientError::Connection { .. })));
        assert!(matches!(
            parse(b":abc\r\n").await,
            Err(ClientError::Protocol { .. })
        ));
    }

    #[test]
    fn test_server_error_mapping() {
        assert!(matches!(
            server_error("NOAUTH Authentication required.".into()),
            ClientError::AuthenticationFailed
        ));
        assert!(matches!(
            server_error("ERR syntax error".into()),
            ClientError::Protocol { .. }
        ));
    }
}
