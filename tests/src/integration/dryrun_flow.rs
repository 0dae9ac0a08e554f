//! # Dry-Run Flow
//!
//! Requests assembled from raw TEAL and prepared transactions, and the
//! failure modes of reading a node's answer.

#[cfg(test)]
mod tests {
    use aad_apps::prelude::*;
    use aad_dryrun::prelude::*;
    use aad_dryrun::{SourceField, DEFAULT_APP_ID};
    use aad_types::{
        Account, Address, OnComplete, SignedTransaction, SuggestedParams, TealKeyValue,
        Transaction,
    };
    use proptest::prelude::*;
    use serde_json::json;

    use crate::integration::fixtures::{counter_app, creator, player};

    fn call(app_id: u64) -> SignedTransaction {
        SignedTransaction::from(
            Transaction::application_call(
                player(),
                &SuggestedParams::default(),
                app_id,
                OnComplete::NoOp,
            )
            .with_args(vec![b"count".to_vec()]),
        )
    }

    // =============================================================================
    // REQUESTS
    // =============================================================================

    #[test]
    fn test_source_run_request() {
        let request = source_run(
            &call(8),
            "#pragma version 5\nint 1\nreturn",
            vec![TealKeyValue::new("counter", 2u64)],
            Some(Account::new(player(), 5)),
        )
        .unwrap();

        assert_eq!(request.apps.len(), 1);
        assert_eq!(request.apps[0].id, 8);
        assert_eq!(request.sources.len(), 1);
        assert_eq!(request.sources[0].field_name, SourceField::Approval);
        assert_eq!(request.sources[0].app_index, 8);
        assert_eq!(request.accounts, vec![Account::new(player(), 5)]);
    }

    #[test]
    fn test_builder_run_request() {
        let request = builder_run(&call(0), &counter_app(), Vec::new(), None).unwrap();
        assert_eq!(request.apps[0].id, DEFAULT_APP_ID);
        assert_eq!(request.apps[0].params.creator, Some(player()));
        assert_eq!(request.sources.len(), 2);
        assert_eq!(
            request.sources[0].source,
            counter_app().approval_source().unwrap()
        );
    }

    #[test]
    fn test_incomplete_requests() {
        let no_txn = DryrunContext::new()
            .with_app_builder(&counter_app())
            .unwrap()
            .build_request();
        assert!(matches!(no_txn, Err(DryrunError::IncompleteDryrun(_))));

        let no_program = DryrunContext::new().with_txn(call(3)).build_request();
        assert!(matches!(no_program, Err(DryrunError::IncompleteDryrun(_))));
    }

    #[test]
    fn test_group_of_calls() {
        let request = DryrunContext::new()
            .with_app_builder(&counter_app())
            .unwrap()
            .with_txn_call(vec![b"count".to_vec()], vec![], Some(player()))
            .with_txn_call(vec![b"count".to_vec()], vec![player()], Some(creator()))
            .build_request()
            .unwrap();

        assert_eq!(request.txns.len(), 2);
        assert_eq!(request.apps[0].params.creator, Some(player()));
        let senders: Vec<Address> = request.accounts.iter().map(|a| a.address).collect();
        assert_eq!(senders, vec![player(), creator()]);
    }

    // =============================================================================
    // RESULTS
    // =============================================================================

    #[test]
    fn test_node_error_is_reported() {
        let result = DryrunResponse::from_json(
            r#"{"error": "cannot find application 8", "protocol-version": "", "txns": null}"#,
        )
        .unwrap();
        assert_eq!(
            check_err(&result),
            Err(DryrunError::DryrunFailed("cannot find application 8".into()))
        );
        assert!(matches!(
            get_global_deltas(&result),
            Err(DryrunError::MalformedResult(_))
        ));
    }

    #[test]
    fn test_rejected_call() {
        let result = DryrunResponse::from_value(json!({
            "txns": [{
                "disassembly": ["#pragma version 5", "int 0", "return"],
                "app-call-messages": ["ApprovalProgram", "REJECT"],
                "app-call-trace": [
                    {"line": 1, "pc": 1, "stack": []},
                    {"line": 2, "pc": 2, "stack": [{"type": 2, "uint": 0}]}
                ]
            }]
        }))
        .unwrap();

        assert!(check_err(&result).is_ok());
        assert!(!passed(&result, 0).unwrap());
        assert_eq!(get_messages(&result).unwrap().last().unwrap(), "REJECT");
        assert!(get_global_deltas(&result).unwrap().is_empty());
    }

    #[test]
    fn test_deltas_across_a_group() {
        let result = DryrunResponse::from_value(json!({
            "txns": [
                {
                    "app-call-messages": ["PASS"],
                    "global-delta": [{"key": "Y291bnRlcg==", "value": {"action": 2, "uint": 5}}],
                    "local-deltas": [{
                        "address": player().to_string(),
                        "delta": [{"key": "dmlzaXRz", "value": {"action": 2, "uint": 1}}]
                    }]
                },
                {
                    "app-call-messages": ["PASS"],
                    "global-delta": [{"key": "Y291bnRlcg==", "value": {"action": 2, "uint": 6}}],
                    "local-deltas": [{
                        "address": creator().to_string(),
                        "delta": [{"key": "dmlzaXRz", "value": {"action": 3}}]
                    }]
                }
            ]
        }))
        .unwrap();

        assert_eq!(
            get_global_deltas(&result).unwrap(),
            vec![KeyDelta::set("counter", 5u64), KeyDelta::set("counter", 6u64)]
        );
        let all = get_all_local_deltas(&result).unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[&player()], vec![KeyDelta::set("visits", 1u64)]);
        assert_eq!(all[&creator()], vec![KeyDelta::delete("visits")]);
    }

    #[test]
    fn test_trace_of_missing_txn() {
        let result = DryrunResponse::from_value(json!({"txns": []})).unwrap();
        assert!(matches!(
            get_trace(&result, 0),
            Err(DryrunError::MalformedResult(_))
        ));
    }

    proptest! {
        #[test]
        fn prop_configuration_order_does_not_matter(app_id in 1u64..u64::MAX, round in any::<u64>()) {
            let base = DryrunContext::new().with_app_builder(&counter_app()).unwrap();
            let first = base
                .clone()
                .with_txn_call(vec![b"count".to_vec()], vec![], Some(player()))
                .with_round(round)
                .with_app_id(app_id)
                .build_request()
                .unwrap();
            let second = base
                .with_app_id(app_id)
                .with_round(round)
                .with_txn_call(vec![b"count".to_vec()], vec![], Some(player()))
                .build_request()
                .unwrap();
            prop_assert_eq!(&first, &second);
            prop_assert_eq!(first.txns[0].txn.app_id, app_id);
            prop_assert_eq!(first.sources[0].app_index, app_id);
        }
    }
}
