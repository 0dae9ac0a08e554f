//! # Invocation Dispatch
//!
//! How the assembled approval program routes calls: creation, the
//! on-completion handlers, named invocations, and the rejecting fallback.
//! Also covers per-account state and the read-only views of other apps.

#[cfg(test)]
mod tests {
    use aad_apps::prelude::*;
    use aad_dryrun::prelude::*;
    use aad_types::{Account, OnComplete, StateSchema, TealKeyValue, TealValue};
    use serde_json::json;

    use crate::integration::fixtures::{counter_app, creator, player};

    /// A per-account nickname set on opt-in, plus the shared counter.
    fn nickname_app() -> AppBuilder {
        let local = StateLocal::new([
            KeyInfo::bytes("nick").unwrap().with_default(Expr::bytes("anon")).unwrap(),
            KeyInfo::uint("visits").unwrap(),
        ])
        .unwrap();
        let rename = local
            .set("nick", Txn::application_args(1))
            .unwrap();
        counter_app()
            .with_local_state(local)
            .with_invocation("rename", Expr::seq([rename, Expr::approve()]))
            .unwrap()
            .with_on_close_out(Expr::approve())
    }

    #[test]
    fn test_only_handled_on_completions_are_routed() {
        let source = nickname_app().approval_source().unwrap();
        for name in ["OptIn", "CloseOut", "NoOp"] {
            assert!(source.contains(&format!("int {name}")), "{name} not routed");
        }
        // Without handlers, update and delete fall through to the rejecting branch.
        assert!(!source.contains("int UpdateApplication"));
        assert!(!source.contains("int DeleteApplication"));

        let source = nickname_app()
            .with_on_update(Expr::approve())
            .approval_source()
            .unwrap();
        assert!(source.contains("int UpdateApplication"));
        assert!(source.contains("txn ApplicationID"));
        assert!(source.contains("txn NumAppArgs"));
    }

    #[test]
    fn test_invocations_in_registration_order() {
        let builder = nickname_app();
        let names: Vec<&[u8]> = builder.invocation_names().collect();
        assert_eq!(names, vec![b"count".as_slice(), b"rename".as_slice()]);

        let source = builder.approval_source().unwrap();
        let count = source.find("byte 0x636f756e74\n").unwrap();
        let rename = source.find("byte 0x72656e616d65\n").unwrap();
        assert!(count < rename);
    }

    #[test]
    fn test_opt_in_writes_local_defaults() {
        let builder = nickname_app();
        let source = builder.approval_source().unwrap();
        // "anon" is the only local default; "visits" has none.
        assert!(source.contains("byte 0x616e6f6e"));
        assert!(source.contains("app_local_put"));
        assert_eq!(builder.local_state().unwrap().defaults().len(), 1);
        assert_eq!(
            builder.build_schema().unwrap(),
            AppSchema {
                global: StateSchema::new(1, 0),
                local: StateSchema::new(1, 1),
            }
        );
    }

    #[test]
    fn test_clear_program_ignores_invocations() {
        let builder = nickname_app();
        assert_eq!(builder.clear_source().unwrap(), "#pragma version 5\nint 1\nreturn");

        let builder = builder.with_on_clear(Expr::reject());
        assert_eq!(builder.clear_source().unwrap(), "#pragma version 5\nint 0\nreturn");
    }

    #[test]
    fn test_typed_writes_are_checked() {
        let local = StateLocal::new([KeyInfo::uint("visits").unwrap()]).unwrap();
        assert!(matches!(
            local.set("visits", Expr::bytes("many")),
            Err(AppError::TypeMismatch { .. })
        ));
        assert!(matches!(
            local.get("missing"),
            Err(AppError::UnknownKey { .. })
        ));
    }

    #[test]
    fn test_other_apps_are_read_only() {
        let infos = [KeyInfo::uint("counter").unwrap()];
        let global = StateGlobalExternal::new(infos.clone(), Txn::applications(1)).unwrap();
        assert!(matches!(
            global.set("counter", Expr::int(1)),
            Err(AppError::ReadOnlyState { .. })
        ));
        assert!(global.get("counter").is_ok());

        let local =
            StateLocalExternal::new(infos, Txn::applications(1), Txn::accounts(1)).unwrap();
        assert!(matches!(
            local.delete("counter"),
            Err(AppError::ReadOnlyState { .. })
        ));
    }

    #[test]
    fn test_rename_dry_run_with_seeded_local_state() {
        let request = DryrunContext::new()
            .with_app_builder(&nickname_app())
            .unwrap()
            .with_app_id(33)
            .with_creator(creator())
            .with_account_state(player(), vec![TealKeyValue::new("nick", "anon")])
            .with_txn_call(
                vec![b"rename".to_vec(), b"ada".to_vec()],
                vec![],
                Some(player()),
            )
            .build_request()
            .unwrap();

        assert_eq!(request.apps[0].params.creator, Some(creator()));
        assert_eq!(request.accounts.len(), 1);
        assert_eq!(
            request.accounts[0].local_value(33, "nick"),
            Some(&TealValue::from("anon"))
        );

        let result = DryrunResponse::from_value(json!({
            "txns": [{
                "app-call-messages": ["ApprovalProgram", "PASS"],
                "local-deltas": [{
                    "address": player().to_string(),
                    "delta": [{"key": "bmljaw==", "value": {"action": 1, "bytes": "YWRh"}}]
                }]
            }]
        }))
        .unwrap();
        assert_eq!(
            get_local_deltas(&result, &player()).unwrap(),
            vec![KeyDelta::set("nick", "ada")]
        );
        assert!(get_global_deltas(&result).unwrap().is_empty());
    }

    #[test]
    fn test_close_out_call() {
        let request = DryrunContext::new()
            .with_app_builder(&nickname_app())
            .unwrap()
            .with_on_complete_call(OnComplete::CloseOut, vec![], vec![], Some(player()))
            .with_account(Account::new(player(), 1_000_000))
            .build_request()
            .unwrap();
        assert_eq!(request.txns[0].txn.on_complete, OnComplete::CloseOut);
        assert_eq!(request.accounts[0].amount, 1_000_000);
    }
}
