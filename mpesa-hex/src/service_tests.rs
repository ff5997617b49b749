//! RelayService unit tests.

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;
    use base64::{Engine, engine::general_purpose::STANDARD};
    use chrono::Utc;
    use serde_json::json;

    use mpesa_types::{
        AppError, CallbackAck, GatewayError, Msisdn, PaymentGateway, PaymentRecord, PaymentStore,
        StkPushDescriptor, StkTimestamp, StoreError, derive_password,
    };

    use crate::{RelayConfig, RelayService};

    /// Gateway double that records every descriptor it receives.
    pub struct MockGateway {
        pushes: Mutex<Vec<StkPushDescriptor>>,
        fail: bool,
    }

    impl MockGateway {
        pub fn new() -> Self {
            Self {
                pushes: Mutex::new(Vec::new()),
                fail: false,
            }
        }

        pub fn failing() -> Self {
            Self {
                pushes: Mutex::new(Vec::new()),
                fail: true,
            }
        }

        pub fn pushes(&self) -> Vec<StkPushDescriptor> {
            self.pushes.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl PaymentGateway for MockGateway {
        async fn stk_push(
            &self,
            descriptor: &StkPushDescriptor,
        ) -> Result<serde_json::Value, GatewayError> {
            self.pushes.lock().unwrap().push(descriptor.clone());
            if self.fail {
                return Err(GatewayError::Transport("connection refused".into()));
            }
            Ok(json!({
                "MerchantRequestID": "29115-34620561-1",
                "CheckoutRequestID": "ws_CO_191220191020363925",
                "ResponseCode": "0",
                "ResponseDescription": "Success. Request accepted for processing",
                "CustomerMessage": "Success. Request accepted for processing"
            }))
        }
    }

    /// Simple in-memory store that can be told to fail.
    pub struct MockStore {
        records: Mutex<Vec<PaymentRecord>>,
        fail: bool,
        inserts: AtomicUsize,
        lists: AtomicUsize,
    }

    impl MockStore {
        pub fn new() -> Self {
            Self::with_records(Vec::new())
        }

        pub fn with_records(records: Vec<PaymentRecord>) -> Self {
            Self {
                records: Mutex::new(records),
                fail: false,
                inserts: AtomicUsize::new(0),
                lists: AtomicUsize::new(0),
            }
        }

        pub fn unreachable() -> Self {
            Self {
                fail: true,
                ..Self::new()
            }
        }

        pub fn records(&self) -> Vec<PaymentRecord> {
            self.records.lock().unwrap().clone()
        }

        pub fn insert_attempts(&self) -> usize {
            self.inserts.load(Ordering::SeqCst)
        }

        pub fn list_calls(&self) -> usize {
            self.lists.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl PaymentStore for MockStore {
        async fn insert(&self, record: &PaymentRecord) -> Result<(), StoreError> {
            self.inserts.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(StoreError::Transport("store unreachable".into()));
            }
            self.records.lock().unwrap().insert(0, record.clone());
            Ok(())
        }

        async fn list_recent(&self, limit: usize) -> Result<Vec<PaymentRecord>, StoreError> {
            self.lists.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(StoreError::Transport("store unreachable".into()));
            }
            Ok(self
                .records
                .lock()
                .unwrap()
                .iter()
                .take(limit)
                .cloned()
                .collect())
        }
    }

    fn decode_password(password: &str) -> String {
        String::from_utf8(STANDARD.decode(password).unwrap()).unwrap()
    }

    fn config() -> RelayConfig {
        RelayConfig::new("174379", "passkey", "https://relay.example.com/callback")
    }

    fn service(gateway: MockGateway, store: MockStore) -> RelayService<MockGateway, MockStore> {
        RelayService::new(config(), gateway, store)
    }

    fn record(phone: &str, success: bool) -> PaymentRecord {
        PaymentRecord {
            phone: phone.to_string(),
            amount: 100,
            success,
            result_code: Some(if success { 0 } else { 1032 }),
            result_desc: None,
            checkout_request_id: None,
            merchant_request_id: None,
            receipt_number: None,
            raw_payload: "{}".to_string(),
            created_at: Utc::now(),
        }
    }

    fn callback_body(result_code: serde_json::Value, phone: &str, amount: i64) -> String {
        json!({
            "Body": { "stkCallback": {
                "MerchantRequestID": "29115-34620561-1",
                "CheckoutRequestID": "ws_CO_191220191020363925",
                "ResultCode": result_code,
                "ResultDesc": "done",
                "CallbackMetadata": { "Item": [
                    { "Name": "PhoneNumber", "Value": phone },
                    { "Name": "Amount", "Value": amount }
                ] }
            } }
        })
        .to_string()
    }

    /// Background writes are detached; poll until they land.
    async fn wait_for_attempts(store: &MockStore, n: usize) {
        tokio::time::timeout(Duration::from_secs(2), async {
            while store.insert_attempts() < n {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("background write did not happen in time");
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // initiate_payment
    // ─────────────────────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_initiate_payment_success() {
        let service = service(MockGateway::new(), MockStore::new());

        let ack = service
            .initiate_payment(Some("254712345678"), Some(100))
            .await
            .unwrap();

        assert_eq!(ack["ResponseCode"], "0");

        let pushes = service.gateway().pushes();
        assert_eq!(pushes.len(), 1);
        let push = &pushes[0];
        assert_eq!(push.shortcode, "174379");
        assert_eq!(push.amount, 100);
        assert_eq!(push.phone.as_str(), "254712345678");
        assert_eq!(push.transaction_type, "CustomerPayBillOnline");
        assert_eq!(push.callback_url, "https://relay.example.com/callback");
        assert_eq!(push.account_reference, "Youth Registration");
        assert_eq!(push.transaction_desc, "Membership Payment");
        assert_eq!(
            decode_password(&push.password),
            format!("174379passkey{}", push.timestamp)
        );
    }

    #[tokio::test]
    async fn test_invalid_phone_makes_no_gateway_call() {
        let service = service(MockGateway::new(), MockStore::new());

        for phone in [None, Some(""), Some("0712345678"), Some("25471234567x")] {
            let result = service.initiate_payment(phone, Some(100)).await;
            assert!(
                matches!(result, Err(AppError::BadRequest(ref m)) if m == "invalid phone format"),
                "{phone:?}"
            );
        }

        assert!(service.gateway().pushes().is_empty());
    }

    #[tokio::test]
    async fn test_non_positive_amount_fails() {
        let service = service(MockGateway::new(), MockStore::new());

        for amount in [None, Some(0), Some(-1), Some(i64::MIN)] {
            let result = service.initiate_payment(Some("254712345678"), amount).await;
            assert!(
                matches!(result, Err(AppError::BadRequest(ref m)) if m == "amount must be positive"),
                "{amount:?}"
            );
        }

        assert!(service.gateway().pushes().is_empty());
    }

    #[tokio::test]
    async fn test_phone_is_checked_before_amount() {
        let service = service(MockGateway::new(), MockStore::new());

        let result = service.initiate_payment(Some("bad"), Some(0)).await;

        assert!(matches!(result, Err(AppError::BadRequest(ref m)) if m == "invalid phone format"));
    }

    #[tokio::test]
    async fn test_gateway_failure_is_internal_error() {
        let service = service(MockGateway::failing(), MockStore::new());

        let result = service.initiate_payment(Some("254712345678"), Some(1)).await;

        assert!(matches!(result, Err(AppError::Internal(_))));
        assert_eq!(service.gateway().pushes().len(), 1);
    }

    #[test]
    fn test_build_descriptor_uses_given_timestamp() {
        let service = service(MockGateway::new(), MockStore::new());
        let ts = StkTimestamp::from_naive(
            &chrono::NaiveDate::from_ymd_opt(2024, 1, 2)
                .unwrap()
                .and_hms_opt(3, 4, 5)
                .unwrap(),
        );

        let descriptor =
            service.build_descriptor(Msisdn::parse("254700000000").unwrap(), 10, ts.clone());

        assert_eq!(descriptor.timestamp.as_str(), "20240102030405");
        assert_eq!(descriptor.password, derive_password("174379", "passkey", &ts));
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // ingest_callback
    // ─────────────────────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_callback_success_is_stored() {
        let service = service(MockGateway::new(), MockStore::new());
        let body = callback_body(json!(0), "254712345678", 500);

        let ack = service.ingest_callback(body.clone());
        assert_eq!(ack, CallbackAck::accepted());

        wait_for_attempts(service.store(), 1).await;
        let records = service.store().records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].phone, "254712345678");
        assert_eq!(records[0].amount, 500);
        assert!(records[0].success);
        assert_eq!(records[0].raw_payload, body);
    }

    #[tokio::test]
    async fn test_callback_failure_code_is_stored_as_unsuccessful() {
        let service = service(MockGateway::new(), MockStore::new());

        service.ingest_callback(callback_body(json!(1), "254712345678", 500));
        service.ingest_callback(callback_body(serde_json::Value::Null, "254712345679", 500));

        wait_for_attempts(service.store(), 2).await;
        let records = service.store().records();
        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| !r.success));
    }

    #[tokio::test]
    async fn test_callback_ack_survives_unreachable_store() {
        let service = service(MockGateway::new(), MockStore::unreachable());

        let ack = service.ingest_callback(callback_body(json!(0), "254712345678", 500));

        assert_eq!(ack, CallbackAck::accepted());
        wait_for_attempts(service.store(), 1).await;
        assert!(service.store().records().is_empty());
    }

    #[tokio::test]
    async fn test_unreadable_callback_is_acknowledged_and_dropped() {
        let service = service(MockGateway::new(), MockStore::new());

        let ack = service.ingest_callback("<xml/>".to_string());
        assert_eq!(ack, CallbackAck::accepted());

        // Give the detached task a chance to run.
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(service.store().insert_attempts(), 0);
    }

    #[tokio::test]
    async fn test_duplicate_callbacks_are_not_deduplicated() {
        let service = service(MockGateway::new(), MockStore::new());
        let body = callback_body(json!(0), "254712345678", 500);

        service.ingest_callback(body.clone());
        service.ingest_callback(body);

        wait_for_attempts(service.store(), 2).await;
        assert_eq!(service.store().records().len(), 2);
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // check_status
    // ─────────────────────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_check_status_paid() {
        let store = MockStore::with_records(vec![
            record("254700000000", true),
            record("254712345678", false),
            record("254712345678", true),
        ]);
        let service = service(MockGateway::new(), store);

        let status = service.check_status(Some("254712345678")).await;

        assert!(status.paid);
    }

    #[tokio::test]
    async fn test_check_status_unpaid_cases() {
        let store = MockStore::with_records(vec![
            record("254700000000", true),
            record("254712345678", false),
        ]);
        let service = service(MockGateway::new(), store);

        assert!(!service.check_status(Some("254712345678")).await.paid);
        assert!(!service.check_status(Some("254799999999")).await.paid);
    }

    #[tokio::test]
    async fn test_check_status_store_error_is_unpaid() {
        let service = service(MockGateway::new(), MockStore::unreachable());

        let status = service.check_status(Some("254712345678")).await;

        assert!(!status.paid);
        assert_eq!(service.store().list_calls(), 1);
    }

    #[tokio::test]
    async fn test_check_status_without_phone_skips_store() {
        let service = service(MockGateway::new(), MockStore::new());

        assert!(!service.check_status(None).await.paid);
        assert!(!service.check_status(Some("")).await.paid);
        assert_eq!(service.store().list_calls(), 0);
    }

    #[tokio::test]
    async fn test_check_status_respects_page_size() {
        let mut records: Vec<_> = (0..5).map(|_| record("254700000000", false)).collect();
        records.push(record("254712345678", true));
        let mut config = config();
        config.status_page_size = 5;
        let service = RelayService::new(config, MockGateway::new(), MockStore::with_records(records));

        assert!(!service.check_status(Some("254712345678")).await.paid);
    }
}
