use async_trait::async_trait;
use serde::Deserialize;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tracing::{debug, trace};

use super::LocationSensor;
use crate::domain::Coordinate;
use crate::error::DashboardError;

const WATCH_COMMAND: &[u8] = b"?WATCH={\"enable\":true,\"json\":true};\n";

/// Reads one fix from a gpsd daemon over its JSON socket protocol.
#[derive(Debug, Clone)]
pub struct GpsdSensor {
    addr: String,
}

/// The subset of a gpsd report we care about. `mode` is 2 for a 2D fix and
/// 3 for a 3D fix.
#[derive(Debug, Deserialize)]
struct GpsdReport {
    class: String,
    #[serde(default)]
    mode: u8,
    lat: Option<f64>,
    lon: Option<f64>,
}

impl GpsdSensor {
    pub fn new(addr: impl Into<String>) -> Self {
        Self { addr: addr.into() }
    }
}

fn fix_from_line(line: &str) -> Option<Coordinate> {
    let report: GpsdReport = serde_json::from_str(line).ok()?;
    if report.class != "TPV" || report.mode < 2 {
        return None;
    }
    Some(Coordinate::new(report.lat?, report.lon?))
}

#[async_trait]
impl LocationSensor for GpsdSensor {
    async fn current_position(&self) -> Result<Coordinate, DashboardError> {
        debug!(addr = %self.addr, "connecting to gpsd");
        let mut stream = TcpStream::connect(&self.addr).await?;
        stream.write_all(WATCH_COMMAND).await?;

        let mut lines = BufReader::new(stream).lines();
        while let Some(line) = lines.next_line().await? {
            trace!(%line, "gpsd report");
            if let Some(coordinate) = fix_from_line(&line) {
                return Ok(coordinate);
            }
        }

        Err(DashboardError::SensorUnavailable(
            "gpsd closed the connection before reporting a fix".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncReadExt;
    use tokio::net::TcpListener;

    #[test]
    fn test_only_tpv_with_fix_counts() {
        assert_eq!(
            fix_from_line(r#"{"class":"TPV","mode":3,"lat":37.7,"lon":-122.4}"#),
            Some(Coordinate::new(37.7, -122.4))
        );
        assert_eq!(fix_from_line(r#"{"class":"TPV","mode":1}"#), None);
        assert_eq!(fix_from_line(r#"{"class":"SKY","mode":3,"lat":1.0,"lon":2.0}"#), None);
        assert_eq!(fix_from_line("not json"), None);
    }

    #[tokio::test]
    async fn test_reads_first_fix() -> Result<(), Box<dyn std::error::Error>> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?.to_string();

        let server = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await?;
            let mut buf = [0_u8; 128];
            let read = socket.read(&mut buf).await?;
            socket
                .write_all(
                    b"{\"class\":\"VERSION\",\"release\":\"3.25\"}\n\
                      {\"class\":\"TPV\",\"mode\":1}\n\
                      {\"class\":\"TPV\",\"mode\":2,\"lat\":51.5,\"lon\":-0.12}\n",
                )
                .await?;
            Ok::<_, std::io::Error>(String::from_utf8_lossy(&buf[..read]).to_string())
        });

        let coordinate = GpsdSensor::new(addr).current_position().await?;
        let command = server.await??;

        assert!(command.starts_with("?WATCH="));
        assert_eq!(coordinate, Coordinate::new(51.5, -0.12));
        Ok(())
    }

    #[tokio::test]
    async fn test_connection_refused_is_an_error() -> Result<(), Box<dyn std::error::Error>> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?.to_string();
        drop(listener);

        assert!(GpsdSensor::new(addr).current_position().await.is_err());
        Ok(())
    }
}
