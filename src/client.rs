use crate::error::TransportError;
use simple_error::SimpleError;
use std::fs::File;
use std::io::Read;
use std::time::Duration;

/// Readable handle a feed is decoded from. Dropping it closes it.
pub type Stream = Box<dyn Read + Send>;

/// Opens the byte stream behind a feed location.
///
/// Redirects, TLS, headers and retries are the implementor's business.
pub trait Fetcher {
    fn open(&self, location: &str) -> Result<Stream, TransportError>;
}

impl<F> Fetcher for F
where
    F: Fn(&str) -> Result<Stream, TransportError>,
{
    fn open(&self, location: &str) -> Result<Stream, TransportError> {
        self(location)
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub connect_timeout: Duration,
    /// Deadline for the whole request, body included. `None` waits forever.
    pub timeout: Option<Duration>,
    pub redirects: u32,
    pub user_agent: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            connect_timeout: Duration::from_secs(10),
            timeout: Some(Duration::from_secs(30)),
            redirects: 5,
            user_agent: concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// HTTP fetcher. Anything but a 2xx answer is a transport error.
pub struct Client {
    agent: ureq::Agent,
}

impl Client {
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    pub fn with_config(config: Config) -> Self {
        let mut builder = ureq::AgentBuilder::new()
            .timeout_connect(config.connect_timeout)
            .redirects(config.redirects)
            .user_agent(&config.user_agent);
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        Client {
            agent: builder.build(),
        }
    }
}

impl Default for Client {
    fn default() -> Self {
        Self::new()
    }
}

impl Fetcher for Client {
    fn open(&self, url: &str) -> Result<Stream, TransportError> {
        log::debug!("GET {}", url);
        match self.agent.get(url).call() {
            Ok(resp) if (200..300).contains(&resp.status()) => {
                log::debug!("{} answered {} {}", url, resp.status(), resp.content_type());
                let stream: Stream = resp.into_reader();
                Ok(stream)
            }
            // 3xx that was not followed
            Ok(resp) => {
                log::warn!("{} answered {}", url, resp.status());
                Err(Box::new(SimpleError::new(format!(
                    "{}: status code {}",
                    resp.get_url(),
                    resp.status()
                ))))
            }
            Err(e) => {
                if let ureq::Error::Status(code, _) = &e {
                    log::warn!("{} answered {}", url, code);
                }
                Err(Box::new(e))
            }
        }
    }
}

/// Reads feeds from the local filesystem, accepting plain paths and
/// `file://` locations.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileFetcher;

impl Fetcher for FileFetcher {
    fn open(&self, location: &str) -> Result<Stream, TransportError> {
        let path = location.strip_prefix("file://").unwrap_or(location);
        let file = File::open(path)?;
        Ok(Box::new(file))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::util::init_test_log;
    use std::io::Write;
    use std::net::{TcpListener, TcpStream};
    use std::thread;
    use std::time::Instant;

    /// Answers a single request on a local port and returns its URL.
    pub(crate) fn serve_once(status: &'static str, body: &'static str) -> String {
        serve_with(status, "", body)
    }

    fn serve_with(status: &'static str, headers: &'static str, body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind failed");
        let addr = listener.local_addr().expect("no local addr");
        thread::spawn(move || {
            if let Ok((mut stream, _)) = listener.accept() {
                read_request(&mut stream);
                let resp = format!(
                    "HTTP/1.1 {}\r\nContent-Type: application/rss+xml\r\n{}Content-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status,
                    headers,
                    body.len(),
                    body
                );
                let _ = stream.write_all(resp.as_bytes());
            }
        });
        format!("http://{}/feed.xml", addr)
    }

    /// Accepts one connection and never answers it.
    fn serve_stalled(stall: Duration) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind failed");
        let addr = listener.local_addr().expect("no local addr");
        thread::spawn(move || {
            if let Ok((mut stream, _)) = listener.accept() {
                read_request(&mut stream);
                thread::sleep(stall);
            }
        });
        format!("http://{}/feed.xml", addr)
    }

    fn read_request(stream: &mut TcpStream) {
        let mut req = Vec::new();
        let mut chunk = [0u8; 512];
        while !req.windows(4).any(|w| w == b"\r\n\r\n") {
            match stream.read(&mut chunk) {
                Ok(0) | Err(_) => break,
                Ok(n) => req.extend_from_slice(&chunk[..n]),
            }
        }
    }

    fn read_all(mut stream: Stream) -> String {
        let mut s = String::new();
        stream.read_to_string(&mut s).expect("read failed");
        s
    }

    #[test]
    fn http_body_is_streamed() {
        init_test_log();
        let url = serve_once("200 OK", "<rss/>");
        let stream = Client::new().open(&url).expect("open failed");
        assert_eq!(read_all(stream), "<rss/>");
    }

    #[test]
    fn non_success_status_fails() {
        init_test_log();
        let url = serve_once("404 Not Found", "gone");
        let err = Client::new().open(&url).err().expect("must fail");
        assert!(err.to_string().contains("status code 404"));
    }

    #[test]
    fn unfollowed_redirects_fail() {
        init_test_log();
        let url = serve_once("300 Multiple Choices", "<rss><channel/></rss>");
        let err = Client::new().open(&url).err().expect("must fail");
        assert!(err.to_string().contains("status code 300"));

        let url = serve_with(
            "302 Found",
            "Location: http://127.0.0.1:1/elsewhere.xml\r\n",
            "<rss><channel/></rss>",
        );
        let client = Client::with_config(Config {
            redirects: 0,
            ..Default::default()
        });
        let err = crate::fetch_channel_with(&client, &url).expect_err("must fail");
        assert!(err.is_transport());
        assert!(err.to_string().contains("302"));
    }

    #[test]
    fn stalled_server_hits_deadline() {
        init_test_log();
        let url = serve_stalled(Duration::from_secs(5));
        let client = Client::with_config(Config {
            timeout: Some(Duration::from_millis(200)),
            ..Default::default()
        });
        let started = Instant::now();
        let err = crate::fetch_channel_with(&client, &url).expect_err("must fail");
        assert!(err.is_transport());
        assert!(started.elapsed() < Duration::from_secs(3));
    }

    #[test]
    fn refused_connection_fails() {
        let addr = TcpListener::bind("127.0.0.1:0")
            .and_then(|l| l.local_addr())
            .expect("bind failed");
        let client = Client::with_config(Config {
            connect_timeout: Duration::from_secs(2),
            ..Default::default()
        });
        assert!(client.open(&format!("http://{}/feed.xml", addr)).is_err());
    }

    #[test]
    fn file_paths_and_urls() {
        let path = concat!(env!("CARGO_MANIFEST_DIR"), "/fixtures/sample.rss.xml");
        let plain = read_all(FileFetcher.open(path).expect("open failed"));
        let url = read_all(
            FileFetcher
                .open(&format!("file://{}", path))
                .expect("open failed"),
        );
        assert!(plain.starts_with("<?xml"));
        assert_eq!(plain, url);
        assert!(FileFetcher.open("/no/such/feed.xml").is_err());
    }

    #[test]
    fn closures_are_fetchers() {
        let fetcher = |location: &str| -> Result<Stream, TransportError> {
            Ok(Box::new(std::io::Cursor::new(location.as_bytes().to_vec())))
        };
        assert_eq!(read_all(fetcher.open("abc").expect("open failed")), "abc");
    }
}
