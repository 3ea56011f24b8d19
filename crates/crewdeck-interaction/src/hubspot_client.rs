//! HubSpotClient - REST client for the HubSpot CRM API.
//!
//! Implements [`CrmGateway`]. Token priority: `secret.json` > `HUBSPOT_ACCESS_TOKEN`.
//! Every failure (missing token, transport, HTTP status, unreadable body)
//! is returned as a [`CrmFailure`]; nothing is retried.

use async_trait::async_trait;
use crewdeck_core::config::CrmSettings;
use crewdeck_core::crm::{
    AccountSummary, ConnectionReport, ContactInput, ContactSearch, CrmFailure, CrmGateway,
    CrmObject, CrmResult, ObjectKind, ObjectPage, ObjectSchema, PageRequest, Pipeline,
    PipelineObject, SchemaCatalog,
};
use crewdeck_infrastructure::storage::SecretStorage;
use reqwest::{Client, Method, Url};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::collections::BTreeMap;
use std::time::Duration;

/// Error bodies are cut to this many characters in failure details.
const ERROR_BODY_PREVIEW: usize = 200;

/// Client for the HubSpot REST API.
#[derive(Clone)]
pub struct HubSpotClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl HubSpotClient {
    /// Creates a client. A `None` token makes every call fail with
    /// "CRM token not configured".
    pub fn new(base_url: impl Into<String>, token: Option<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
            token: token.filter(|t| !t.trim().is_empty()),
        }
    }

    /// Builds a client from `[crm]` settings, with a request timeout.
    pub fn from_settings(settings: &CrmSettings, token: Option<String>) -> CrmResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.request_timeout_secs))
            .build()
            .map_err(|e| CrmFailure::new("Failed to build HTTP client").with_detail(e.to_string()))?;
        Ok(Self {
            client,
            ..Self::new(settings.base_url.clone(), token)
        })
    }

    /// Resolves the token from secret storage, then the environment.
    pub fn try_from_storage(settings: &CrmSettings, secrets: &SecretStorage) -> CrmResult<Self> {
        let token = secrets.crm_token().map_err(|e| {
            CrmFailure::new("Failed to read CRM credentials").with_detail(e.to_string())
        })?;
        if token.is_none() {
            tracing::warn!("[HubSpotClient] No CRM token configured; CRM calls will fail");
        }
        Self::from_settings(settings, token)
    }

    pub fn is_configured(&self) -> bool {
        self.token.is_some()
    }

    fn endpoint(&self, segments: &[&str]) -> CrmResult<Url> {
        let mut url = Url::parse(&self.base_url).map_err(|e| {
            CrmFailure::new("Invalid CRM base URL").with_detail(format!("{}: {}", self.base_url, e))
        })?;
        url.path_segments_mut()
            .map_err(|_| CrmFailure::new("Invalid CRM base URL").with_detail(self.base_url.clone()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn send_request<T: DeserializeOwned>(
        &self,
        method: Method,
        segments: &[&str],
        query: &[(&str, String)],
        body: Option<&Value>,
    ) -> CrmResult<T> {
        let token = self.token.as_deref().ok_or_else(CrmFailure::not_configured)?;
        let url = self.endpoint(segments)?;
        tracing::debug!("[HubSpotClient] {} {}", method, url.path());

        let mut request = self
            .client
            .request(method.clone(), url)
            .bearer_auth(token)
            .header("accept", "application/json");
        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|err| {
            tracing::warn!("[HubSpotClient] {} request failed: {}", method, err);
            CrmFailure::new("CRM request failed").with_detail(err.to_string())
        })?;

        let status = response.status();
        let text = response.text().await.map_err(|err| {
            CrmFailure::new("Failed to read CRM response")
                .with_status(status.as_u16())
                .with_detail(err.to_string())
        })?;

        if !status.is_success() {
            tracing::warn!("[HubSpotClient] CRM API error ({})", status);
            return Err(map_http_error(status.as_u16(), &text));
        }

        serde_json::from_str(&text).map_err(|err| {
            CrmFailure::new("Malformed CRM response")
                .with_status(status.as_u16())
                .with_detail(format!("{}: {}", err, preview(&text)))
        })
    }
}

#[derive(Deserialize)]
struct ErrorResponse {
    message: String,
}

fn preview(body: &str) -> String {
    body.chars().take(ERROR_BODY_PREVIEW).collect()
}

fn map_http_error(status: u16, body: &str) -> CrmFailure {
    let detail = serde_json::from_str::<ErrorResponse>(body)
        .map(|e| e.message)
        .unwrap_or_else(|_| preview(body));
    let failure = CrmFailure::new(format!("CRM API error: {}", status)).with_status(status);
    if detail.trim().is_empty() {
        failure
    } else {
        failure.with_detail(detail)
    }
}

#[derive(Deserialize)]
struct ResultList<T> {
    #[serde(default = "Vec::new")]
    results: Vec<T>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Association {
    to_object_id: Value,
}

fn object_id_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[async_trait]
impl CrmGateway for HubSpotClient {
    async fn test_connection(&self) -> CrmResult<ConnectionReport> {
        let account: AccountSummary = self
            .send_request(Method::GET, &["account-info", "v3", "details"], &[], None)
            .await?;
        let contacts: ObjectPage = self
            .send_request(
                Method::GET,
                &["crm", "v3", "objects", "contacts"],
                &[("limit", "1".to_string())],
                None,
            )
            .await?;
        tracing::info!("[HubSpotClient] Connected to portal {:?}", account.portal_id);
        Ok(ConnectionReport {
            account,
            contacts_total: contacts.total,
            has_contacts_access: true,
        })
    }

    async fn list_objects(&self, kind: &ObjectKind, page: &PageRequest) -> CrmResult<ObjectPage> {
        let mut query = page.query_pairs();
        if *kind != ObjectKind::Contacts {
            query.retain(|(key, _)| *key != "q");
        }
        let result = self
            .send_request(
                Method::GET,
                &["crm", "v3", "objects", kind.path_segment()],
                &query,
                None,
            )
            .await;

        match (kind, result) {
            (ObjectKind::Custom(id), Err(failure)) => Err(CrmFailure {
                message: format!(
                    "Custom object '{}' may not exist or you may not have permission to access it",
                    id
                ),
                ..failure
            }),
            (_, result) => result,
        }
    }

    async fn get_contact(&self, contact_id: &str, properties: &[&str]) -> CrmResult<CrmObject> {
        let query = if properties.is_empty() {
            vec![]
        } else {
            vec![("properties", properties.join(","))]
        };
        self.send_request(
            Method::GET,
            &["crm", "v3", "objects", "contacts", contact_id],
            &query,
            None,
        )
        .await
    }

    async fn create_contact(&self, input: &ContactInput) -> CrmResult<CrmObject> {
        let body = json!({ "properties": input.to_properties() });
        let created: CrmObject = self
            .send_request(
                Method::POST,
                &["crm", "v3", "objects", "contacts"],
                &[],
                Some(&body),
            )
            .await?;
        tracing::info!("[HubSpotClient] Created contact {}", created.id);
        Ok(created)
    }

    async fn update_contact(
        &self,
        contact_id: &str,
        properties: &BTreeMap<String, String>,
    ) -> CrmResult<CrmObject> {
        let body = json!({ "properties": properties });
        self.send_request(
            Method::PUT,
            &["crm", "v3", "objects", "contacts", contact_id],
            &[],
            Some(&body),
        )
        .await
    }

    async fn search_contacts(&self, search: &ContactSearch) -> CrmResult<ObjectPage> {
        let body = search.to_request_body();
        self.send_request(
            Method::POST,
            &["crm", "v3", "objects", "contacts", "search"],
            &[],
            Some(&body),
        )
        .await
    }

    async fn list_schemas(&self) -> CrmResult<SchemaCatalog> {
        let schemas: ResultList<ObjectSchema> = self
            .send_request(Method::GET, &["crm", "v3", "schemas"], &[], None)
            .await?;
        Ok(SchemaCatalog::from_schemas(schemas.results))
    }

    async fn list_pipelines(&self, object: PipelineObject) -> CrmResult<Vec<Pipeline>> {
        let pipelines: ResultList<Pipeline> = self
            .send_request(
                Method::GET,
                &["crm", "v3", "pipelines", object.path_segment()],
                &[],
                None,
            )
            .await?;
        Ok(pipelines.results)
    }

    async fn contact_deal_ids(&self, contact_id: &str) -> CrmResult<Vec<String>> {
        let associations: ResultList<Association> = self
            .send_request(
                Method::GET,
                &["crm", "v4", "objects", "contacts", contact_id, "associations", "deals"],
                &[],
                None,
            )
            .await?;
        Ok(associations
            .results
            .iter()
            .filter_map(|a| object_id_string(&a.to_object_id))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};
    use tokio::task::JoinHandle;

    struct Reply {
        status: &'static str,
        content_type: &'static str,
        body: String,
    }

    fn json_reply(body: Value) -> Reply {
        Reply {
            status: "200 OK",
            content_type: "application/json",
            body: body.to_string(),
        }
    }

    async fn read_request(stream: &mut TcpStream) -> String {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 4096];
        loop {
            let n = stream.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);
            let text = String::from_utf8_lossy(&buf);
            if let Some(header_end) = text.find("\r\n\r\n") {
                let content_length = text[..header_end]
                    .lines()
                    .find_map(|line| {
                        let (name, value) = line.split_once(':')?;
                        name.eq_ignore_ascii_case("content-length")
                            .then(|| value.trim().parse::<usize>().ok())
                            .flatten()
                    })
                    .unwrap_or(0);
                if buf.len() >= header_end + 4 + content_length {
                    break;
                }
            }
        }
        String::from_utf8_lossy(&buf).into_owned()
    }

    /// Serves `replies` to consecutive connections and returns the raw requests.
    async fn serve(replies: Vec<Reply>) -> (String, JoinHandle<Vec<String>>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());
        let handle = tokio::spawn(async move {
            let mut requests = Vec::new();
            for reply in replies {
                let (mut stream, _) = listener.accept().await.unwrap();
                requests.push(read_request(&mut stream).await);
                let response = format!(
                    "HTTP/1.1 {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    reply.status,
                    reply.content_type,
                    reply.body.len(),
                    reply.body
                );
                stream.write_all(response.as_bytes()).await.unwrap();
                stream.shutdown().await.unwrap();
            }
            requests
        });
        (base_url, handle)
    }

    fn client(base_url: &str) -> HubSpotClient {
        HubSpotClient::new(base_url, Some("pat-test".to_string()))
    }

    #[tokio::test]
    async fn test_missing_token_fails_without_network() {
        let client = HubSpotClient::new("http://127.0.0.1:9", None);
        assert!(!client.is_configured());

        let failure = client.list_schemas().await.unwrap_err();
        assert_eq!(failure, CrmFailure::not_configured());
    }

    #[tokio::test]
    async fn test_list_contacts_sends_paging_and_token() {
        let (base_url, server) = serve(vec![json_reply(json!({
            "total": 1,
            "results": [{"id": "101", "properties": {"email": "alex@example.com"}}],
            "paging": {"next": {"after": "102"}}
        }))])
        .await;

        let page = PageRequest {
            limit: 5,
            query: Some("alex".to_string()),
            ..Default::default()
        };
        let result = client(&base_url)
            .list_objects(&ObjectKind::Contacts, &page)
            .await
            .unwrap();
        assert_eq!(result.results[0].property("email"), Some("alex@example.com"));
        assert_eq!(result.next_after(), Some("102"));

        let requests = server.await.unwrap();
        assert!(requests[0].starts_with("GET /crm/v3/objects/contacts?limit=5&q=alex "));
        assert!(requests[0].to_ascii_lowercase().contains("authorization: bearer pat-test"));
    }

    #[tokio::test]
    async fn test_deals_ignore_free_text_query() {
        let (base_url, server) = serve(vec![json_reply(json!({"results": []}))]).await;

        let page = PageRequest {
            query: Some("ignored".to_string()),
            properties: vec!["dealname".to_string()],
            ..Default::default()
        };
        client(&base_url)
            .list_objects(&ObjectKind::Deals, &page)
            .await
            .unwrap();

        let requests = server.await.unwrap();
        assert!(requests[0].starts_with("GET /crm/v3/objects/deals?limit=10&properties=dealname "));
    }

    #[tokio::test]
    async fn test_html_error_body_is_normalized() {
        let (base_url, server) = serve(vec![Reply {
            status: "500 Internal Server Error",
            content_type: "text/html",
            body: "<html><body>Upstream exploded</body></html>".to_string(),
        }])
        .await;

        let failure = client(&base_url).list_schemas().await.unwrap_err();
        assert_eq!(failure.status, Some(500));
        assert_eq!(failure.message, "CRM API error: 500");
        assert!(failure.detail.unwrap().contains("Upstream exploded"));
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_json_error_message_is_extracted() {
        let (base_url, server) = serve(vec![Reply {
            status: "401 Unauthorized",
            content_type: "application/json",
            body: json!({"status": "error", "message": "Authentication credentials not found."})
                .to_string(),
        }])
        .await;

        let failure = client(&base_url).test_connection().await.unwrap_err();
        assert_eq!(failure.status, Some(401));
        assert_eq!(failure.detail.as_deref(), Some("Authentication credentials not found."));
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_non_json_success_body_is_malformed() {
        let (base_url, server) = serve(vec![Reply {
            status: "200 OK",
            content_type: "text/plain",
            body: "definitely not json".to_string(),
        }])
        .await;

        let failure = client(&base_url)
            .list_pipelines(PipelineObject::Deals)
            .await
            .unwrap_err();
        assert_eq!(failure.message, "Malformed CRM response");
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_connection_refused_is_normalized() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());
        drop(listener);

        let failure = client(&base_url).test_connection().await.unwrap_err();
        assert_eq!(failure.message, "CRM request failed");
        assert!(failure.status.is_none());
        assert!(failure.detail.is_some());
    }

    #[tokio::test]
    async fn test_connection_report() {
        let (base_url, server) = serve(vec![
            json_reply(json!({"portalId": 4242, "accountType": "STANDARD", "timeZone": "US/Eastern"})),
            json_reply(json!({"total": 17, "results": []})),
        ])
        .await;

        let report = client(&base_url).test_connection().await.unwrap();
        assert_eq!(report.account.portal_id, Some(4242));
        assert_eq!(report.contacts_total, Some(17));
        assert!(report.has_contacts_access);

        let requests = server.await.unwrap();
        assert!(requests[0].starts_with("GET /account-info/v3/details "));
        assert!(requests[1].starts_with("GET /crm/v3/objects/contacts?limit=1 "));
    }

    #[tokio::test]
    async fn test_search_posts_filter_body() {
        let (base_url, server) =
            serve(vec![json_reply(json!({"total": 0, "results": []}))]).await;

        client(&base_url)
            .search_contacts(&ContactSearch::email_token("example.com"))
            .await
            .unwrap();

        let requests = server.await.unwrap();
        assert!(requests[0].starts_with("POST /crm/v3/objects/contacts/search "));
        assert!(requests[0].contains("CONTAINS_TOKEN"));
        assert!(requests[0].contains("createdate"));
    }

    #[tokio::test]
    async fn test_update_contact_uses_put() {
        let (base_url, server) =
            serve(vec![json_reply(json!({"id": "7", "properties": {"company": "Lumen"}}))]).await;

        let props = BTreeMap::from([("company".to_string(), "Lumen".to_string())]);
        let updated = client(&base_url).update_contact("7", &props).await.unwrap();
        assert_eq!(updated.property("company"), Some("Lumen"));

        let requests = server.await.unwrap();
        assert!(requests[0].starts_with("PUT /crm/v3/objects/contacts/7 "));
    }

    #[tokio::test]
    async fn test_contact_deal_ids_accept_numbers() {
        let (base_url, server) = serve(vec![json_reply(json!({
            "results": [
                {"toObjectId": 9001, "associationTypes": []},
                {"toObjectId": "9002", "associationTypes": []}
            ]
        }))])
        .await;

        let ids = client(&base_url).contact_deal_ids("55").await.unwrap();
        assert_eq!(ids, vec!["9001".to_string(), "9002".to_string()]);

        let requests = server.await.unwrap();
        assert!(requests[0].starts_with("GET /crm/v4/objects/contacts/55/associations/deals "));
    }

    #[tokio::test]
    async fn test_schemas_are_split() {
        let (base_url, server) = serve(vec![json_reply(json!({
            "results": [
                {"objectTypeId": "contacts", "name": "contacts"},
                {"objectTypeId": "2-47887496", "name": "artists", "properties": [{}, {}, {}]}
            ]
        }))])
        .await;

        let catalog = client(&base_url).list_schemas().await.unwrap();
        assert_eq!(catalog.total_schemas, 2);
        assert_eq!(catalog.custom_objects[0].property_count, 3);
        server.await.unwrap();
    }
}
