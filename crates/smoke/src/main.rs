use fanpanel_client::{ClientConfig, ClientError, DeviceClient};
use tokio::time::{timeout, Duration};
use url::Url;

#[tokio::main]
async fn main() {
    let raw = std::env::args().nth(1).unwrap_or_else(|| "http://127.0.0.1:8080".to_string());
    let url = match Url::parse(&raw) {
        Ok(url) => url,
        Err(e) => {
            eprintln!("Invalid device URL {}: {}", raw, e);
            std::process::exit(1);
        }
    };
    eprintln!("Checking {}", url);

    let config = ClientConfig { base_url: url.to_string(), request_timeout: None };
    let client = match DeviceClient::new(&config) {
        Ok(client) => client,
        Err(e) => {
            eprintln!("Client setup failed: {}", e);
            std::process::exit(1);
        }
    };

    // Both reads must finish within 5s
    let check = async {
        let fans = client.fan_readings().await?;
        let settings = client.general_settings().await?;
        Ok::<_, ClientError>((fans, settings))
    };
    match timeout(Duration::from_secs(5), check).await {
        Ok(Ok((fans, settings))) => {
            for fan in &fans {
                println!(
                    "fan {}: {} RPM, {}%",
                    fan.name.as_deref().unwrap_or("?"),
                    fan.speed,
                    fan.power
                );
            }
            println!(
                "runtimeOfFans={:?} interval={:?}",
                settings.runtime_of_fans, settings.interval
            );
            if fans.len() != 2 {
                eprintln!("Expected 2 fans, got {}", fans.len());
                std::process::exit(3);
            }
        }
        Ok(Err(e @ ClientError::Decode { .. })) => {
            eprintln!("Malformed response: {}", e);
            std::process::exit(3);
        }
        Ok(Err(e)) => {
            eprintln!("Request failed: {}", e);
            std::process::exit(2);
        }
        Err(_) => {
            eprintln!("Timeout waiting for device");
            std::process::exit(4);
        }
    }
}
