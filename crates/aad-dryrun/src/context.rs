//! # Dry-Run Context
//!
//! Accumulates an application under test, calls against it and seeded
//! ledger state, then builds a [`DryrunRequest`].
//!
//! Configuration is order-independent: calls are materialized only in
//! [`DryrunContext::build_request`], so `with_app_id` may come after the
//! calls it affects. Every `with_*` returns a new value, so a base context
//! can be cloned into variants.

use aad_apps::{AppBuilder, AppSchema};
use aad_types::{
    Account, Address, Application, ApplicationParams, OnComplete, SignedTransaction, StateSchema,
    SuggestedParams, TealKeyValue, Transaction,
};
use tracing::debug;

use crate::errors::DryrunError;
use crate::request::{DryrunRequest, DryrunSource, SourceField};

/// Id given to the application under test unless one is set.
pub const DEFAULT_APP_ID: u64 = u64::MAX;

/// One program of the application under test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Program {
    /// TEAL source, attached to the request as a [`DryrunSource`].
    Source(String),
    /// Assembled bytecode, attached to the application params.
    Compiled(Vec<u8>),
}

/// The programs of the application under test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppPrograms {
    /// Approval program.
    pub approval: Program,
    /// Clear-state program, if the calls need one.
    pub clear: Option<Program>,
}

impl AppPrograms {
    /// Both programs as TEAL source.
    #[must_use]
    pub fn source(approval: impl Into<String>, clear: impl Into<String>) -> Self {
        Self {
            approval: Program::Source(approval.into()),
            clear: Some(Program::Source(clear.into())),
        }
    }

    /// Only an approval program, as TEAL source.
    #[must_use]
    pub fn approval_source(approval: impl Into<String>) -> Self {
        Self {
            approval: Program::Source(approval.into()),
            clear: None,
        }
    }

    /// Both programs as bytecode.
    #[must_use]
    pub fn compiled(approval: Vec<u8>, clear: Vec<u8>) -> Self {
        Self {
            approval: Program::Compiled(approval),
            clear: Some(Program::Compiled(clear)),
        }
    }
}

#[derive(Debug, Clone)]
enum PendingTxn {
    Call {
        on_complete: OnComplete,
        args: Vec<Vec<u8>>,
        accounts: Vec<Address>,
        sender: Option<Address>,
    },
    Signed(SignedTransaction),
}

/// Builder for a dry-run request.
#[derive(Debug, Clone, Default)]
pub struct DryrunContext {
    programs: Option<AppPrograms>,
    schema: AppSchema,
    app_id: Option<u64>,
    creator: Option<Address>,
    global_state: Vec<TealKeyValue>,
    account_states: Vec<(Address, Vec<TealKeyValue>)>,
    txns: Vec<PendingTxn>,
    apps: Vec<Application>,
    accounts: Vec<Account>,
    params: SuggestedParams,
    round: u64,
    latest_timestamp: u64,
}

impl DryrunContext {
    /// An empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the application under test.
    #[must_use]
    pub fn with_app(mut self, programs: AppPrograms, schema: AppSchema) -> Self {
        self.programs = Some(programs);
        self.schema = schema;
        self
    }

    /// Sets the application under test from a builder, compiling both
    /// programs to source locally.
    ///
    /// # Errors
    ///
    /// * `App` - the schema overflows or a program is ill-typed
    pub fn with_app_builder(self, builder: &AppBuilder) -> Result<Self, DryrunError> {
        let schema = builder.build_schema()?;
        let programs = AppPrograms::source(builder.approval_source()?, builder.clear_source()?);
        Ok(self.with_app(programs, schema))
    }

    /// Id of the application under test; [`DEFAULT_APP_ID`] otherwise.
    #[must_use]
    pub fn with_app_id(mut self, app_id: u64) -> Self {
        self.app_id = Some(app_id);
        self
    }

    /// Creator of the application under test; the first sender otherwise.
    #[must_use]
    pub fn with_creator(mut self, creator: Address) -> Self {
        self.creator = Some(creator);
        self
    }

    /// Fee and validity window for the generated calls.
    #[must_use]
    pub fn with_params(mut self, params: SuggestedParams) -> Self {
        self.params = params;
        self
    }

    /// Appends a no-op call to the application under test. The sender
    /// defaults to the zero address.
    #[must_use]
    pub fn with_txn_call(
        self,
        args: Vec<Vec<u8>>,
        accounts: Vec<Address>,
        sender: Option<Address>,
    ) -> Self {
        self.with_on_complete_call(OnComplete::NoOp, args, accounts, sender)
    }

    /// Appends a call to the application under test with an explicit
    /// on-completion action.
    #[must_use]
    pub fn with_on_complete_call(
        mut self,
        on_complete: OnComplete,
        args: Vec<Vec<u8>>,
        accounts: Vec<Address>,
        sender: Option<Address>,
    ) -> Self {
        self.txns.push(PendingTxn::Call {
            on_complete,
            args,
            accounts,
            sender,
        });
        self
    }

    /// Appends a prepared transaction, unchanged.
    #[must_use]
    pub fn with_txn(mut self, txn: impl Into<SignedTransaction>) -> Self {
        self.txns.push(PendingTxn::Signed(txn.into()));
        self
    }

    /// Seeds the local state `address` holds for the application under test.
    /// Replaces earlier seeds for the same address.
    #[must_use]
    pub fn with_account_state(mut self, address: Address, key_values: Vec<TealKeyValue>) -> Self {
        self.account_states.retain(|(seeded, _)| *seeded != address);
        self.account_states.push((address, key_values));
        self
    }

    /// Seeds the global state of the application under test.
    #[must_use]
    pub fn with_global_state(mut self, key_values: Vec<TealKeyValue>) -> Self {
        self.global_state = key_values;
        self
    }

    /// Adds another application to the ledger.
    #[must_use]
    pub fn with_application(mut self, app: Application) -> Self {
        self.apps.push(app);
        self
    }

    /// Adds an account to the ledger.
    #[must_use]
    pub fn with_account(mut self, account: Account) -> Self {
        self.accounts.push(account);
        self
    }

    /// Round the evaluation pretends to run in.
    #[must_use]
    pub fn with_round(mut self, round: u64) -> Self {
        self.round = round;
        self
    }

    /// Value of `global LatestTimestamp`.
    #[must_use]
    pub fn with_latest_timestamp(mut self, timestamp: u64) -> Self {
        self.latest_timestamp = timestamp;
        self
    }

    /// Id the application under test runs as.
    #[must_use]
    pub fn app_id(&self) -> u64 {
        self.app_id.unwrap_or(DEFAULT_APP_ID)
    }

    /// Builds the request.
    ///
    /// # Errors
    ///
    /// * `IncompleteDryrun` - no program (neither an app under test nor any
    ///   attached application) or no transaction
    pub fn build_request(&self) -> Result<DryrunRequest, DryrunError> {
        if self.programs.is_none() && self.apps.is_empty() {
            return Err(DryrunError::IncompleteDryrun(
                "no program: set an app under test or attach an application".into(),
            ));
        }
        if self.txns.is_empty() {
            return Err(DryrunError::IncompleteDryrun("no transaction".into()));
        }

        let app_id = self.app_id();
        let txns: Vec<SignedTransaction> =
            self.txns.iter().map(|txn| self.materialize(txn, app_id)).collect();

        let mut apps = self.apps.clone();
        let mut sources = Vec::new();
        if let Some(programs) = &self.programs {
            let creator = self
                .creator
                .or_else(|| txns.first().map(|signed| signed.txn.sender));
            let (app, app_sources) = self.app_under_test(programs, app_id, creator);
            apps.retain(|other| other.id != app_id);
            apps.insert(0, app);
            sources = app_sources;
        } else if !self.global_state.is_empty() {
            if let Some(app) = apps.iter_mut().find(|app| app.id == app_id) {
                app.params.global_state.clone_from(&self.global_state);
            }
        }

        let accounts = self.collect_accounts(&txns, app_id);

        debug!(
            app_id,
            txns = txns.len(),
            apps = apps.len(),
            accounts = accounts.len(),
            sources = sources.len(),
            "built dry-run request"
        );
        Ok(DryrunRequest {
            txns,
            apps,
            accounts,
            sources,
            protocol_version: String::new(),
            round: self.round,
            latest_timestamp: self.latest_timestamp,
        })
    }

    fn materialize(&self, pending: &PendingTxn, app_id: u64) -> SignedTransaction {
        match pending {
            PendingTxn::Call {
                on_complete,
                args,
                accounts,
                sender,
            } => Transaction::application_call(
                sender.unwrap_or(Address::ZERO),
                &self.params,
                app_id,
                *on_complete,
            )
            .with_args(args.clone())
            .with_accounts(accounts.clone())
            .into(),
            PendingTxn::Signed(signed) => signed.clone(),
        }
    }

    fn app_under_test(
        &self,
        programs: &AppPrograms,
        app_id: u64,
        creator: Option<Address>,
    ) -> (Application, Vec<DryrunSource>) {
        let mut params = ApplicationParams {
            creator,
            global_state_schema: Some(self.schema.global),
            local_state_schema: Some(self.schema.local),
            global_state: self.global_state.clone(),
            ..ApplicationParams::default()
        };
        let mut sources = Vec::new();

        let mut attach = |field_name: SourceField, program: &Program| match program {
            Program::Source(source) => sources.push(DryrunSource {
                field_name,
                source: source.clone(),
                txn_index: 0,
                app_index: app_id,
            }),
            Program::Compiled(bytes) => match field_name {
                SourceField::ClearState => params.clear_state_program = Some(bytes.clone()),
                _ => params.approval_program = Some(bytes.clone()),
            },
        };
        attach(SourceField::Approval, &programs.approval);
        if let Some(clear) = &programs.clear {
            attach(SourceField::ClearState, clear);
        }

        (Application::new(app_id, params), sources)
    }

    /// Explicit accounts, then seeded local states, then any sender not yet
    /// present.
    fn collect_accounts(&self, txns: &[SignedTransaction], app_id: u64) -> Vec<Account> {
        let mut accounts = self.accounts.clone();

        for (address, key_values) in &self.account_states {
            match accounts.iter_mut().find(|account| account.address == *address) {
                Some(account) => {
                    *account = std::mem::take(account).with_local_state(app_id, key_values.clone());
                }
                None => accounts
                    .push(Account::new(*address, 0).with_local_state(app_id, key_values.clone())),
            }
        }

        for signed in txns {
            let sender = signed.txn.sender;
            if !accounts.iter().any(|account| account.address == sender) {
                accounts.push(Account::new(sender, 0));
            }
        }
        accounts
    }
}

// =============================================================================
// CONVENIENCE CONSTRUCTORS
// =============================================================================

fn single_call_context(txn: &SignedTransaction, sender_state: Option<Account>) -> DryrunContext {
    let mut context = DryrunContext::new().with_txn(txn.clone());
    if txn.txn.app_id != 0 {
        context = context.with_app_id(txn.txn.app_id);
    }
    if let Some(account) = sender_state {
        context = context.with_account(account);
    }
    context
}

/// Runs `source` as the approval program of the app `txn` calls, with room
/// for the largest state the platform allows.
///
/// # Errors
///
/// Never fails for a well-formed call; see [`DryrunContext::build_request`].
pub fn source_run(
    txn: &SignedTransaction,
    source: impl Into<String>,
    global_state: Vec<TealKeyValue>,
    sender_state: Option<Account>,
) -> Result<DryrunRequest, DryrunError> {
    let schema = AppSchema {
        global: StateSchema::new(64, 64),
        local: StateSchema::new(64, 64),
    };
    single_call_context(txn, sender_state)
        .with_app(AppPrograms::approval_source(source), schema)
        .with_global_state(global_state)
        .build_request()
}

/// Runs the programs of `builder` as the app `txn` calls.
///
/// # Errors
///
/// * `App` - the builder's schema overflows or a program is ill-typed
pub fn builder_run(
    txn: &SignedTransaction,
    builder: &AppBuilder,
    global_state: Vec<TealKeyValue>,
    sender_state: Option<Account>,
) -> Result<DryrunRequest, DryrunError> {
    single_call_context(txn, sender_state)
        .with_app_builder(builder)?
        .with_global_state(global_state)
        .build_request()
}

#[cfg(test)]
mod tests {
    use super::*;
    use aad_apps::AppError;
    use aad_teal::Expr;

    fn alice() -> Address {
        Address::new([1u8; 32])
    }

    fn bob() -> Address {
        Address::new([2u8; 32])
    }

    fn base() -> DryrunContext {
        DryrunContext::new().with_app(
            AppPrograms::source("#pragma version 5\nint 1", "#pragma version 5\nint 1"),
            AppSchema::default(),
        )
    }

    #[test]
    fn test_requires_program_and_txn() {
        assert!(matches!(
            DryrunContext::new()
                .with_txn_call(vec![], vec![], None)
                .build_request(),
            Err(DryrunError::IncompleteDryrun(_))
        ));
        assert!(matches!(
            base().build_request(),
            Err(DryrunError::IncompleteDryrun(_))
        ));
    }

    #[test]
    fn test_call_targets_app_under_test() {
        let request = base()
            .with_txn_call(vec![b"count".to_vec()], vec![bob()], Some(alice()))
            .build_request()
            .unwrap();

        let txn = &request.txns[0].txn;
        assert_eq!(txn.app_id, DEFAULT_APP_ID);
        assert_eq!(txn.sender, alice());
        assert_eq!(txn.app_args, vec![b"count".to_vec()]);
        assert_eq!(txn.accounts, vec![bob()]);
        assert_eq!(request.apps[0].id, DEFAULT_APP_ID);
        assert_eq!(request.apps[0].params.creator, Some(alice()));
        assert_eq!(request.accounts.len(), 1);
        assert_eq!(request.accounts[0].address, alice());
    }

    #[test]
    fn test_order_independent() {
        let a = base()
            .with_txn_call(vec![], vec![], None)
            .with_app_id(7)
            .build_request()
            .unwrap();
        let b = base()
            .with_app_id(7)
            .with_txn_call(vec![], vec![], None)
            .build_request()
            .unwrap();
        assert_eq!(a, b);
        assert_eq!(a.txns[0].txn.app_id, 7);
    }

    #[test]
    fn test_sources_attached() {
        let request = base()
            .with_txn_call(vec![], vec![], None)
            .build_request()
            .unwrap();
        let fields: Vec<SourceField> = request.sources.iter().map(|s| s.field_name).collect();
        assert_eq!(fields, vec![SourceField::Approval, SourceField::ClearState]);
        assert!(request.sources.iter().all(|s| s.app_index == DEFAULT_APP_ID));
        assert!(request.apps[0].params.approval_program.is_none());
    }

    #[test]
    fn test_compiled_programs_attached_to_params() {
        let request = DryrunContext::new()
            .with_app(AppPrograms::compiled(vec![1], vec![2]), AppSchema::default())
            .with_txn_call(vec![], vec![], None)
            .build_request()
            .unwrap();
        assert!(request.sources.is_empty());
        assert_eq!(request.apps[0].params.approval_program, Some(vec![1]));
        assert_eq!(request.apps[0].params.clear_state_program, Some(vec![2]));
    }

    #[test]
    fn test_seeded_state() {
        let request = base()
            .with_app_id(3)
            .with_global_state(vec![TealKeyValue::new("counter", 1u64)])
            .with_account_state(alice(), vec![TealKeyValue::new("name", "x")])
            .with_account(Account::new(alice(), 100))
            .with_txn_call(vec![], vec![], Some(bob()))
            .with_round(10)
            .with_latest_timestamp(1_700_000_000)
            .build_request()
            .unwrap();

        assert_eq!(
            request.apps[0].params.global_value("counter").and_then(|v| v.as_uint()),
            Some(1)
        );
        assert_eq!(request.accounts.len(), 2);
        assert_eq!(request.accounts[0].amount, 100);
        assert!(request.accounts[0].local_value(3, "name").is_some());
        assert_eq!(request.accounts[1].address, bob());
        assert_eq!(request.round, 10);
        assert_eq!(request.latest_timestamp, 1_700_000_000);
    }

    #[test]
    fn test_fork_from_base() {
        let base = base().with_app_id(4);
        let count = base
            .clone()
            .with_txn_call(vec![b"count".to_vec()], vec![], None)
            .build_request()
            .unwrap();
        let reset = base
            .with_txn_call(vec![b"reset".to_vec()], vec![], None)
            .build_request()
            .unwrap();
        assert_eq!(count.apps, reset.apps);
        assert_ne!(count.txns, reset.txns);
    }

    #[test]
    fn test_builder_run_uses_clear_program() {
        let builder = AppBuilder::new().with_on_clear(Expr::int(0));
        let call = SignedTransaction::from(Transaction::application_call(
            alice(),
            &SuggestedParams::default(),
            5,
            OnComplete::ClearState,
        ));
        let request = builder_run(&call, &builder, Vec::new(), None).unwrap();

        assert_eq!(request.apps[0].id, 5);
        let clear = request
            .sources
            .iter()
            .find(|s| s.field_name == SourceField::ClearState)
            .unwrap();
        assert_eq!(clear.source, "#pragma version 5\nint 0\nreturn");
    }

    #[test]
    fn test_source_run() {
        let call = SignedTransaction::from(Transaction::application_call(
            alice(),
            &SuggestedParams::default(),
            0,
            OnComplete::NoOp,
        ));
        let request = source_run(&call, "#pragma version 5\nint 1", Vec::new(), None).unwrap();

        assert_eq!(request.sources.len(), 1);
        assert_eq!(request.sources[0].field_name, SourceField::Approval);
        assert_eq!(request.apps[0].id, DEFAULT_APP_ID);
        assert_eq!(
            request.apps[0].params.global_state_schema,
            Some(StateSchema::new(64, 64))
        );
        assert_eq!(request.txns[0].txn.app_id, 0);
    }

    #[test]
    fn test_builder_errors_propagate() {
        let err = DryrunContext::new()
            .with_app_builder(&AppBuilder::new().with_on_clear(Expr::bytes("x")))
            .unwrap_err();
        assert!(matches!(err, DryrunError::App(AppError::Compile(_))));
    }
}
