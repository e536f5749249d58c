use std::sync::Arc;
use std::time::Duration;

use log::{debug, info, warn};
use reqwest::Method;

use crate::domain::{DomainBreakdown, PublicSuffixList, ZoneName};
use crate::error::Error;
use crate::record::Record;
use crate::status::check_status;
use crate::transport::{HttpRequest, HttpTransport, Transport};
use crate::xmlrpc::{self, MethodCall, RecordList, Shape, StringValue};

pub const BASE_URL: &str = "https://api.loopia.se/RPCSERV";

const ADD_ZONE_RECORD: &str = "addZoneRecord";
const REMOVE_ZONE_RECORD: &str = "removeZoneRecord";
const GET_ZONE_RECORDS: &str = "getZoneRecords";
const REMOVE_SUBDOMAIN: &str = "removeSubdomain";

/// Client for the zone-record calls of the Loopia API.
///
/// Holds no per-call state; one client can serve concurrent callers as long
/// as its transport can.
pub struct Client<T = HttpTransport> {
    transport: T,
    endpoint: String,
    api_user: String,
    api_password: String,
    breakdown: Arc<dyn DomainBreakdown>,
}

impl Client<HttpTransport> {
    pub fn new(
        api_user: impl Into<String>,
        api_password: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        Ok(Self::with_transport(
            HttpTransport::new(timeout)?,
            api_user,
            api_password,
        ))
    }
}

impl<T: Transport> Client<T> {
    pub fn with_transport(
        transport: T,
        api_user: impl Into<String>,
        api_password: impl Into<String>,
    ) -> Self {
        Self {
            transport,
            endpoint: BASE_URL.to_string(),
            api_user: api_user.into(),
            api_password: api_password.into(),
            breakdown: Arc::new(PublicSuffixList),
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_breakdown(mut self, breakdown: impl DomainBreakdown + 'static) -> Self {
        self.breakdown = Arc::new(breakdown);
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Adds `record` under `domain`. An unset TTL is sent as 3600.
    pub async fn add_record(&self, record: &Record, domain: &str) -> Result<(), Error> {
        let Some(zone) = self.zone(domain)? else {
            return Ok(());
        };

        let call = self
            .zone_call(ADD_ZONE_RECORD, &zone)
            .param(record.to_param());
        self.status_call(call, domain).await?;

        info!(
            "Added {} record to {} (ttl {})",
            record.record_type,
            zone,
            record.effective_ttl()
        );
        Ok(())
    }

    pub async fn remove_record(&self, domain: &str, record_id: i64) -> Result<(), Error> {
        let Some(zone) = self.zone(domain)? else {
            return Ok(());
        };

        let call = self.zone_call(REMOVE_ZONE_RECORD, &zone).param(record_id);
        self.status_call(call, domain).await?;

        info!("Removed record {} from {}", record_id, zone);
        Ok(())
    }

    /// Lists the records of `domain`. There is no status to check: a call
    /// without a fault is a success.
    pub async fn get_records(&self, domain: &str) -> Result<Vec<Record>, Error> {
        let Some(zone) = self.zone(domain)? else {
            return Ok(Vec::new());
        };

        let call = self.zone_call(GET_ZONE_RECORDS, &zone);
        let list: RecordList = self.call(&call, domain).await?;

        info!("Fetched {} record(s) for {}", list.records.len(), zone);
        Ok(list.records)
    }

    pub async fn remove_subdomain(&self, domain: &str) -> Result<(), Error> {
        let Some(zone) = self.zone(domain)? else {
            return Ok(());
        };

        let call = self.zone_call(REMOVE_SUBDOMAIN, &zone);
        self.status_call(call, domain).await?;

        info!("Removed subdomain {}", zone);
        Ok(())
    }

    /// Splits `domain`; an empty domain means there is nothing to do.
    fn zone(&self, domain: &str) -> Result<Option<ZoneName>, Error> {
        if domain.is_empty() {
            debug!("Empty domain, skipping call");
            return Ok(None);
        }
        ZoneName::split(self.breakdown.as_ref(), domain).map(Some)
    }

    /// Credentials first, then the zone, as every zone call expects.
    fn zone_call(&self, method_name: &'static str, zone: &ZoneName) -> MethodCall {
        MethodCall::new(method_name)
            .param(self.api_user.as_str())
            .param(self.api_password.as_str())
            .param(zone.registered_domain())
            .param(zone.subdomain())
    }

    async fn status_call(&self, call: MethodCall, domain: &str) -> Result<(), Error> {
        let StringValue(status) = self.call(&call, domain).await?;

        check_status(&status).map_err(|source| {
            warn!("{} for {} returned status {:?}", call.method_name, domain, status.trim());
            Error::Status {
                method: call.method_name,
                domain: domain.to_string(),
                source,
            }
        })
    }

    /// One request/response cycle: encode, send, decode, check for a fault.
    async fn call<S: Shape>(&self, call: &MethodCall, domain: &str) -> Result<S, Error> {
        let method = call.method_name;
        let body = xmlrpc::encode(call).map_err(|source| Error::Encoding {
            method,
            domain: domain.to_string(),
            source,
        })?;

        debug!("Calling {} for {} at {}", method, domain, self.endpoint);
        let request = HttpRequest {
            method: Method::POST,
            url: self.endpoint.clone(),
            headers: vec![("Content-Type", "text/xml".to_string())],
            body,
        };
        let response = self
            .transport
            .send(request)
            .await
            .map_err(|source| Error::Transport {
                method,
                domain: domain.to_string(),
                source,
            })?;

        if response.is_empty() {
            return Err(Error::EmptyResponseBody {
                method,
                domain: domain.to_string(),
            });
        }

        let decoded = xmlrpc::decode::<S>(&response).map_err(|source| Error::MalformedResponse {
            method,
            domain: domain.to_string(),
            body: String::from_utf8_lossy(&response).into_owned(),
            source,
        })?;

        if let Some(fault) = decoded.fault {
            warn!(
                "{} for {} failed with fault {}: {}",
                method, domain, fault.code, fault.message
            );
            return Err(Error::RpcFault {
                method,
                domain: domain.to_string(),
                source: fault,
            });
        }

        Ok(decoded.value)
    }
}

impl<T> std::fmt::Debug for Client<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("endpoint", &self.endpoint)
            .field("api_user", &self.api_user)
            .field("api_password", &"<redacted>")
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::domain::Breakdown;
    use crate::status::StatusError;
    use crate::transport::TransportError;

    fn status_response(status: &str) -> Vec<u8> {
        format!(
            "<?xml version=\"1.0\"?><methodResponse><params><param>\
             <value><string>{status}</string></value>\
             </param></params></methodResponse>"
        )
        .into_bytes()
    }

    const FAULT_RESPONSE: &str = "<methodResponse><fault><value><struct>\
        <member><name>faultCode</name><value><int>-32700</int></value></member>\
        <member><name>faultString</name><value><string> parse error </string></value></member>\
        </struct></value></fault></methodResponse>";

    /// Replies with a canned body and remembers what was sent.
    struct FakeTransport {
        reply: Result<Vec<u8>, String>,
        sent: Mutex<Vec<HttpRequest>>,
    }

    impl FakeTransport {
        fn replying(body: impl Into<Vec<u8>>) -> Self {
            Self {
                reply: Ok(body.into()),
                sent: Mutex::new(Vec::new()),
            }
        }

        fn failing(message: &str) -> Self {
            Self {
                reply: Err(message.to_string()),
                sent: Mutex::new(Vec::new()),
            }
        }

        fn sent_bodies(&self) -> Vec<String> {
            self.sent
                .lock()
                .unwrap()
                .iter()
                .map(|r| String::from_utf8_lossy(&r.body).split_whitespace().collect())
                .collect()
        }
    }

    #[async_trait]
    impl Transport for FakeTransport {
        async fn send(&self, request: HttpRequest) -> Result<Vec<u8>, TransportError> {
            self.sent.lock().unwrap().push(request);
            self.reply.clone().map_err(Into::into)
        }
    }

    fn client(transport: FakeTransport) -> Client<FakeTransport> {
        Client::with_transport(transport, "user@loopiaapi", "secret")
    }

    #[tokio::test]
    async fn add_record_sends_full_call_and_accepts_ok() {
        let client = client(FakeTransport::replying(status_response("OK")));

        client
            .add_record(&Record::new("TXT", "v"), "example.com")
            .await
            .unwrap();

        let sent = client.transport.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].method, Method::POST);
        assert_eq!(sent[0].url, BASE_URL);
        assert_eq!(sent[0].headers, vec![("Content-Type", "text/xml".to_string())]);
        drop(sent);

        let body = &client.transport.sent_bodies()[0];
        assert!(body.contains("<methodName>addZoneRecord</methodName>"));
        assert!(body.contains(
            "<params>\
             <param><value><string>user@loopiaapi</string></value></param>\
             <param><value><string>secret</string></value></param>\
             <param><value><string>example.com</string></value></param>\
             <param><value><string>@</string></value></param>\
             <param><value><struct>\
             <member><name>type</name><value><string>TXT</string></value></member>\
             <member><name>ttl</name><value><int>3600</int></value></member>\
             <member><name>priority</name><value><int>0</int></value></member>\
             <member><name>rdata</name><value><string>v</string></value></member>\
             <member><name>record_id</name><value><int>0</int></value></member>\
             </struct></value></param>\
             </params>"
        ));
    }

    #[tokio::test]
    async fn remove_record_sends_id_as_int() {
        let client = client(FakeTransport::replying(status_response("OK")));

        client.remove_record("www.example.com", 1234).await.unwrap();

        let body = &client.transport.sent_bodies()[0];
        assert!(body.contains("<methodName>removeZoneRecord</methodName>"));
        assert!(body.contains(
            "<param><value><string>www</string></value></param>\
             <param><value><int>1234</int></value></param></params>"
        ));
    }

    #[tokio::test]
    async fn remove_subdomain_uses_split_name() {
        let client = client(FakeTransport::replying(status_response(" OK\n")));

        client.remove_subdomain("_acme-challenge.example.com").await.unwrap();

        let body = &client.transport.sent_bodies()[0];
        assert!(body.contains("<methodName>removeSubdomain</methodName>"));
        assert!(body.contains(
            "<param><value><string>example.com</string></value></param>\
             <param><value><string>_acme-challenge</string></value></param></params>"
        ));
    }

    #[tokio::test]
    async fn auth_error_status_is_authentication_failure() {
        let client = client(FakeTransport::replying(status_response("AUTH_ERROR")));

        let err = client.remove_subdomain("www.example.com").await.unwrap_err();
        assert_eq!(err.status(), Some(&StatusError::Authentication));
        assert!(matches!(
            err,
            Error::Status { method: "removeSubdomain", ref domain, .. } if domain == "www.example.com"
        ));
    }

    #[tokio::test]
    async fn other_status_is_unexpected() {
        let client = client(FakeTransport::replying(status_response(" DOMAIN_OCCUPIED ")));

        let err = client
            .add_record(&Record::txt("v"), "example.com")
            .await
            .unwrap_err();
        assert_eq!(
            err.status(),
            Some(&StatusError::Unexpected("DOMAIN_OCCUPIED".to_string()))
        );
    }

    #[tokio::test]
    async fn fault_wins_over_either_shape() {
        let client = client(FakeTransport::replying(FAULT_RESPONSE));
        let err = client.get_records("example.com").await.unwrap_err();
        let fault = err.rpc_fault().unwrap();
        assert_eq!(fault.code, -32700);
        assert_eq!(fault.message, "parse error");

        let client = self::client(FakeTransport::replying(FAULT_RESPONSE));
        let err = client
            .add_record(&Record::txt("v"), "example.com")
            .await
            .unwrap_err();
        assert_eq!(err.rpc_fault().map(|f| f.code), Some(-32700));
    }

    #[tokio::test]
    async fn empty_body_is_rejected_for_every_shape() {
        let client = client(FakeTransport::replying(Vec::new()));

        assert!(matches!(
            client.get_records("example.com").await,
            Err(Error::EmptyResponseBody { method: "getZoneRecords", .. })
        ));
        assert!(matches!(
            client.remove_record("example.com", 1).await,
            Err(Error::EmptyResponseBody { method: "removeZoneRecord", .. })
        ));
    }

    #[tokio::test]
    async fn malformed_body_keeps_raw_text() {
        let client = client(FakeTransport::replying("<methodResponse><params>"));

        let err = client.remove_subdomain("example.com").await.unwrap_err();
        match err {
            Error::MalformedResponse { body, .. } => assert_eq!(body, "<methodResponse><params>"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn transport_failure_is_wrapped_with_context() {
        let client = client(FakeTransport::failing("connection refused"));

        let err = client.get_records("www.example.com").await.unwrap_err();
        assert!(matches!(err, Error::Transport { method: "getZoneRecords", .. }));
        assert_eq!(
            err.to_string(),
            "getZoneRecords for www.example.com: transport: connection refused"
        );
    }

    #[tokio::test]
    async fn empty_domain_is_a_no_op() {
        let client = client(FakeTransport::failing("must not be called"));

        client.add_record(&Record::txt("v"), "").await.unwrap();
        client.remove_record("", 1).await.unwrap();
        client.remove_subdomain("").await.unwrap();
        assert!(client.get_records("").await.unwrap().is_empty());
        assert!(client.transport.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn invalid_domain_fails_before_sending() {
        let client = client(FakeTransport::replying(status_response("OK")));

        assert!(matches!(
            client.remove_subdomain("localhost").await,
            Err(Error::InvalidDomain(d)) if d == "localhost"
        ));
        assert!(client.transport.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn leading_dot_never_reaches_the_apex() {
        let client = client(FakeTransport::replying(status_response("OK")));

        assert!(matches!(
            client.remove_subdomain(".example.com").await,
            Err(Error::InvalidDomain(d)) if d == ".example.com"
        ));
        assert!(matches!(
            client.remove_record("www..example.com", 1).await,
            Err(Error::InvalidDomain(_))
        ));
        assert!(client.transport.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn injected_breakdown_is_used() {
        struct Everything;

        impl DomainBreakdown for Everything {
            fn breakdown(&self, domain: &str) -> Option<Breakdown> {
                Some(Breakdown {
                    registered_domain: domain.to_string(),
                    subdomain: String::new(),
                })
            }
        }

        let client = client(FakeTransport::replying(status_response("OK")))
            .with_breakdown(Everything)
            .with_endpoint("http://127.0.0.1:9/RPCSERV");

        client.remove_subdomain("intranet").await.unwrap();

        let sent = client.transport.sent.lock().unwrap();
        assert_eq!(sent[0].url, "http://127.0.0.1:9/RPCSERV");
        drop(sent);
        let body = &client.transport.sent_bodies()[0];
        assert!(body.contains(
            "<param><value><string>intranet</string></value></param>\
             <param><value><string>@</string></value></param>"
        ));
    }

    #[test]
    fn debug_hides_password() {
        let client = client(FakeTransport::replying(Vec::new()));
        let debug = format!("{client:?}");
        assert!(debug.contains("user@loopiaapi"));
        assert!(!debug.contains("secret"));
    }
}
