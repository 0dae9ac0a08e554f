//! # Global Counter Flow
//!
//! Deploys the counter app against the in-memory node, builds a dry run
//! calling `count`, and reads the node's answer back as a trace and deltas.

#[cfg(test)]
mod tests {
    use aad_apps::prelude::*;
    use aad_dryrun::prelude::*;
    use aad_types::{
        Address, OnComplete, PendingTransactionInfo, StateSchema, SuggestedParams, TealKeyValue,
        TealValue,
    };
    use serde_json::json;

    use crate::integration::fixtures::{counter_app, creator, player};

    // =============================================================================
    // TEST FIXTURES
    // =============================================================================

    /// What the node answers for one `count` call against a fresh counter.
    fn count_response() -> DryrunResponse {
        DryrunResponse::from_value(json!({
            "error": "",
            "protocol-version": "future",
            "txns": [{
                "disassembly": [
                    "#pragma version 5",
                    "byte 0x636f756e746572",
                    "byte 0x636f756e746572",
                    "app_global_get",
                    "int 1",
                    "+",
                    "app_global_put",
                    "int 1",
                    "return"
                ],
                "app-call-messages": ["ApprovalProgram", "PASS"],
                "app-call-trace": [
                    {"line": 1, "pc": 1, "stack": []},
                    {"line": 2, "pc": 2, "stack": [{"type": 1, "bytes": "Y291bnRlcg=="}]},
                    {"line": 3, "pc": 11, "stack": [
                        {"type": 1, "bytes": "Y291bnRlcg=="},
                        {"type": 1, "bytes": "Y291bnRlcg=="}
                    ]},
                    {"line": 4, "pc": 20, "stack": [
                        {"type": 1, "bytes": "Y291bnRlcg=="},
                        {"type": 2, "uint": 0}
                    ]},
                    {"line": 5, "pc": 21, "stack": [
                        {"type": 1, "bytes": "Y291bnRlcg=="},
                        {"type": 2, "uint": 0},
                        {"type": 2, "uint": 1}
                    ]},
                    {"line": 6, "pc": 23, "stack": [
                        {"type": 1, "bytes": "Y291bnRlcg=="},
                        {"type": 2, "uint": 1}
                    ]},
                    {"line": 7, "pc": 24, "stack": []},
                    {"line": 8, "pc": 25, "stack": [{"type": 2, "uint": 1}]}
                ],
                "global-delta": [
                    {"key": "Y291bnRlcg==", "value": {"action": 2, "uint": 1}}
                ],
                "cost": 8
            }]
        }))
        .unwrap()
    }

    // =============================================================================
    // DEPLOYMENT
    // =============================================================================

    #[test]
    fn test_deploy_counter() {
        let node = InMemoryNode::new();
        let builder = counter_app();

        let txn = builder
            .create_txn(&node, creator(), &SuggestedParams::default())
            .unwrap();
        assert!(txn.is_create());
        assert_eq!(txn.on_complete, OnComplete::NoOp);
        assert_eq!(txn.global_schema, Some(StateSchema::new(1, 0)));
        assert_eq!(txn.local_schema, Some(StateSchema::default()));
        assert_eq!(
            txn.approval_program,
            Some(builder.approval_source().unwrap().into_bytes())
        );

        // The node confirms the create and reports the new id.
        let info: PendingTransactionInfo = serde_json::from_value(json!({
            "application-index": 21,
            "confirmed-round": 1000
        }))
        .unwrap();
        let meta = AppMeta::from_result(&info).unwrap();
        assert_eq!(meta.app_id, 21);
        assert_eq!(meta.address, Address::for_application(21));
    }

    #[test]
    fn test_deployed_app_feeds_dry_run() {
        let node = InMemoryNode::new();
        let builder = counter_app();
        let deployed = builder
            .compiled_application(
                &node,
                21,
                Some(creator()),
                vec![TealKeyValue::new("counter", 4u64)],
            )
            .unwrap();
        node.insert_application(deployed);

        let app = builder.build_application(&node, 21).unwrap();
        let request = DryrunContext::new()
            .with_application(app)
            .with_app_id(21)
            .with_txn_call(vec![b"count".to_vec()], vec![], Some(player()))
            .build_request()
            .unwrap();

        assert!(request.sources.is_empty());
        assert_eq!(request.txns[0].txn.app_id, 21);
        assert_eq!(
            request.apps[0]
                .params
                .global_value("counter")
                .and_then(TealValue::as_uint),
            Some(4)
        );
    }

    // =============================================================================
    // DRY RUN
    // =============================================================================

    #[test]
    fn test_count_request() {
        let request = DryrunContext::new()
            .with_app_builder(&counter_app())
            .unwrap()
            .with_txn_call(vec![b"count".to_vec()], vec![], Some(player()))
            .build_request()
            .unwrap();

        let body: serde_json::Value = serde_json::from_str(&request.to_json().unwrap()).unwrap();
        assert_eq!(body["sources"][0]["field-name"], json!("approv"));
        assert_eq!(body["sources"][1]["field-name"], json!("clearp"));
        assert_eq!(body["txns"][0]["txn"]["type"], json!("appl"));
        assert_eq!(body["txns"][0]["txn"]["snd"], json!(player().to_string()));
        assert_eq!(body["txns"][0]["txn"]["apaa"], json!(["Y291bnQ="]));
        assert_eq!(body["apps"][0]["id"], json!(aad_dryrun::DEFAULT_APP_ID));
        assert_eq!(body["accounts"][0]["address"], json!(player().to_string()));
    }

    #[test]
    fn test_count_result() {
        let result = count_response();
        check_err(&result).unwrap();
        assert!(passed(&result, 0).unwrap());
        assert_eq!(
            get_global_deltas(&result).unwrap(),
            vec![KeyDelta::set("counter", 1u64)]
        );

        let trace: Vec<TraceEntry> = get_trace(&result, 0)
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(trace.len(), 8);
        assert_eq!(trace[3].instruction, "app_global_get");
        let last = trace.last().unwrap();
        assert_eq!(last.instruction, "int 1");
        assert_eq!(last.stack, vec![TealValue::Uint(1)]);
        tracing::debug!(%last, "final trace line");
    }

    #[test]
    fn test_count_source_matches_disassembly_order() {
        // The canned disassembly mirrors the invocation body the builder emits.
        let source = counter_app().approval_source().unwrap();
        let get = source.find("app_global_get").unwrap();
        let put = source.rfind("app_global_put").unwrap();
        assert!(get < put);
        assert!(source.contains("byte 0x636f756e74\n"));
    }
}
