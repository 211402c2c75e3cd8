//! Full runs through the Resource Manager client against a mock endpoint

use std::sync::Arc;

use vm_profiler::cloud::azure::AzureClient;
use vm_profiler::cloud::credential::StaticTokenCredential;
use vm_profiler::config::{AzureConfig, ProfileConfig};
use vm_profiler::orchestrator::{Orchestrator, RunSummary};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::helpers::*;

const SUB: &str = "sub-123";

fn create_test_client(endpoint: &str) -> AzureClient {
    let config = AzureConfig {
        management_endpoint: endpoint.to_string(),
        timeout: Some(5),
    };
    AzureClient::new(&config, Arc::new(StaticTokenCredential::new("test-token"))).unwrap()
}

fn vm_json(name: &str) -> serde_json::Value {
    serde_json::json!({
        "id": format!("/subscriptions/{SUB}/resourceGroups/RG-APP/providers/Microsoft.Compute/virtualMachines/{name}"),
        "name": name,
        "properties": {
            "networkProfile": {
                "networkInterfaces": [{
                    "id": format!("/subscriptions/{SUB}/resourceGroups/RG-APP/providers/Microsoft.Network/networkInterfaces/{name}-nic")
                }]
            }
        }
    })
}

async fn mount_common(mock_server: &MockServer) {
    let next_link = format!("{}/vms-page-2", mock_server.uri());

    Mock::given(method("GET"))
        .and(path(format!(
            "/subscriptions/{SUB}/providers/Microsoft.Compute/virtualMachines"
        )))
        .and(header("authorization", "Bearer test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "value": [vm_json("web-01")],
            "nextLink": next_link
        })))
        .mount(mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/vms-page-2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "value": [vm_json("vm1")]
        })))
        .mount(mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path(format!("/subscriptions/{SUB}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "subscriptionId": SUB,
            "displayName": "Post Office Production"
        })))
        .mount(mock_server)
        .await;
}

#[tokio::test]
async fn test_run_resolves_vm_on_second_page() {
    let mock_server = MockServer::start().await;
    mount_common(&mock_server).await;

    Mock::given(method("GET"))
        .and(path(format!(
            "/subscriptions/{SUB}/resourceGroups/RG-APP/providers/Microsoft.Network/networkInterfaces/vm1-nic"
        )))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "name": "vm1-nic",
            "properties": {
                "ipConfigurations": [{
                    "name": "ipconfig1",
                    "properties": {
                        "privateIPAddress": "10.0.0.4",
                        "publicIPAddress": {
                            "id": format!("/subscriptions/{SUB}/resourceGroups/RG-APP/providers/Microsoft.Network/publicIPAddresses/vm1-ip")
                        }
                    }
                }]
            }
        })))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path(format!(
            "/subscriptions/{SUB}/resourceGroups/RG-APP/providers/Microsoft.Network/publicIPAddresses/vm1-ip"
        )))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "name": "vm1-ip",
            "properties": { "ipAddress": "51.140.0.7" }
        })))
        .mount(&mock_server)
        .await;

    let dirs = TestDirs::new();
    let input = dirs.write_input("alert.json", &create_alert_json("vm1", SUB));

    let orchestrator = Orchestrator::new(
        Arc::new(create_test_client(&mock_server.uri())),
        dirs.directories.clone(),
        ProfileConfig::default(),
    );
    let summary = orchestrator.run().await.unwrap();

    assert_eq!(summary.written, 1);
    assert!(!input.exists());

    let profile = read_json(&dirs.output_for("alert.json"));
    assert_eq!(profile["Private IP"], "10.0.0.4");
    assert_eq!(profile["Public IP"], "51.140.0.7");
    assert_eq!(profile["Azure Account Name"], "Post Office Production");
}

#[tokio::test]
async fn test_run_leaves_alert_when_nic_lookup_fails() {
    let mock_server = MockServer::start().await;
    mount_common(&mock_server).await;

    Mock::given(method("GET"))
        .and(path(format!(
            "/subscriptions/{SUB}/resourceGroups/RG-APP/providers/Microsoft.Network/networkInterfaces/web-01-nic"
        )))
        .respond_with(ResponseTemplate::new(500).set_body_string("InternalServerError"))
        .mount(&mock_server)
        .await;

    let dirs = TestDirs::new();
    let content = create_alert_json("web-01", SUB);
    let input = dirs.write_input("alert.json", &content);

    let orchestrator = Orchestrator::new(
        Arc::new(create_test_client(&mock_server.uri())),
        dirs.directories.clone(),
        ProfileConfig::default(),
    );
    let summary = orchestrator.run().await.unwrap();

    assert_eq!(
        summary,
        RunSummary {
            written: 0,
            quarantined: 0,
            skipped: 1,
        }
    );
    assert_eq!(std::fs::read_to_string(&input).unwrap(), content);
}
