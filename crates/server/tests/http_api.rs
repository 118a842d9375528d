use std::net::SocketAddr;

use anyhow::Result;
use fanpanel_client::{ClientConfig, DeviceClient};
use fanpanel_core::{FanId, FanReading, GeneralSettings};
use fanpanel_device::{router, DeviceConfig, DeviceState};
use reqwest::StatusCode;
use serde_json::json;
use tokio::net::TcpListener;

async fn spawn_device(config: DeviceConfig) -> Result<(DeviceState, SocketAddr)> {
    let state = DeviceState::new(&config);
    let app = router(state.clone(), None);
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    Ok((state, addr))
}

#[tokio::test]
async fn fans_report_in_fixed_order() -> Result<()> {
    let (state, addr) = spawn_device(DeviceConfig::default()).await?;
    state.bank.write().await.start();

    let client = DeviceClient::new(&ClientConfig::new(format!("http://{addr}")))?;
    let readings = client.fan_readings().await?;
    assert_eq!(
        readings,
        vec![FanReading::named(FanId::Front, 900, 60), FanReading::named(FanId::Back, 1050, 70)]
    );
    Ok(())
}

#[tokio::test]
async fn power_and_settings_round_trip() -> Result<()> {
    let (_state, addr) = spawn_device(DeviceConfig::default()).await?;
    let client = DeviceClient::new(&ClientConfig::new(format!("http://{addr}")))?;

    client.set_fan_power(FanId::Back, Some(15)).await?;
    let readings = client.fan_readings().await?;
    assert_eq!(readings[1].power, 15);
    assert_eq!(readings[1].speed, 0); // fans are stopped until the cycle starts them

    client.set_general_settings(&GeneralSettings::new(30, 90)).await?;
    assert_eq!(client.general_settings().await?, GeneralSettings::new(30, 90));
    Ok(())
}

#[tokio::test]
async fn power_requests_are_validated() -> Result<()> {
    let (state, addr) = spawn_device(DeviceConfig::default()).await?;
    let http = reqwest::Client::new();
    let url = format!("http://{addr}/fan");

    let res = http.post(&url).json(&json!({"power": 50})).send().await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(res.text().await?, "Missing 'name' query parameter\n");

    let res = http.post(format!("{url}?name=Side")).json(&json!({"power": 50})).send().await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    for body in [json!({"power": 101}), json!({"power": -1}), json!({"power": "50"}), json!({})] {
        let res = http.post(format!("{url}?name=Front")).json(&body).send().await?;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST, "{body}");
        assert_eq!(res.text().await?, "Invalid 'power' parameter\n");
    }

    let res = http.post(format!("{url}?name=Front")).json(&json!({"power": 42.9})).send().await?;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(state.bank.read().await.fan("Front").map(|f| f.power()), Some(42));
    Ok(())
}

#[tokio::test]
async fn manager_rejects_missing_or_null_fields() -> Result<()> {
    let (state, addr) = spawn_device(DeviceConfig::default()).await?;
    let http = reqwest::Client::new();
    let url = format!("http://{addr}/fanManager");

    for body in [json!({"interval": 10}), json!({"interval": 10, "runtimeOfFans": null})] {
        let res = http.post(&url).json(&body).send().await?;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        assert_eq!(res.text().await?, "Invalid JSON body\n");
    }
    assert_eq!(state.bank.read().await.interval_secs(), 600);
    Ok(())
}

#[tokio::test]
async fn other_methods_are_not_allowed() -> Result<()> {
    let (_state, addr) = spawn_device(DeviceConfig::default()).await?;
    let res = reqwest::Client::new().delete(format!("http://{addr}/fan")).send().await?;
    assert_eq!(res.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(res.text().await?, "Method not allowed\n");
    Ok(())
}

#[tokio::test]
async fn metrics_track_updates() -> Result<()> {
    let (_state, addr) = spawn_device(DeviceConfig::default()).await?;
    let http = reqwest::Client::new();
    http.post(format!("http://{addr}/fan?name=Front")).json(&json!({"power": 80})).send().await?;

    let text = http.get(format!("http://{addr}/metrics")).send().await?.text().await?;
    assert!(text.contains("fanpanel_power_updates_total 1"), "{text}");
    assert!(text.contains("fanpanel_fan_power_percent{fan=\"Front\"} 80"), "{text}");
    Ok(())
}
