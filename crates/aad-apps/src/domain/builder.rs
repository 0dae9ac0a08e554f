//! # Application Builder
//!
//! Assembles invocation handlers and declared state into the approval and
//! clear-state programs, the schemas, and the transactions deploying them.
//!
//! ## Default Behavior
//!
//! | Call | Without a handler |
//! |------|-------------------|
//! | create | writes global defaults, approves |
//! | delete, update, close out | rejected |
//! | opt in | writes local defaults, approves |
//! | clear state | approves |
//! | no-op | rejected unless an invocation name matches |

use aad_teal::{compile_expr, CompileOptions, Expr, TealType, Txn};
use aad_types::{
    Address, Application, ApplicationParams, OnComplete, StateSchema, SuggestedParams,
    TealKeyValue, Transaction,
};
use tracing::{debug, info, instrument, warn};

use crate::domain::invariants::{check_global_schema, check_local_schema};
use crate::domain::state::{State, StateGlobal, StateLocal};
use crate::errors::AppError;
use crate::ports::outbound::{ApplicationReader, ProgramCompiler};

/// Global and local schemas of an application.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AppSchema {
    /// Global entries.
    pub global: StateSchema,
    /// Local entries per opted-in account.
    pub local: StateSchema,
}

/// Declarative description of an application.
///
/// Every `with_*` call consumes the builder and returns the updated value, so
/// a base builder can be cloned and specialized.
#[derive(Debug, Clone, Default)]
pub struct AppBuilder {
    invocations: Vec<(Vec<u8>, Expr)>,
    on_create: Option<Expr>,
    on_delete: Option<Expr>,
    on_update: Option<Expr>,
    on_opt_in: Option<Expr>,
    on_close_out: Option<Expr>,
    on_clear: Option<Expr>,
    on_no_op: Option<Expr>,
    global_state: Option<StateGlobal>,
    local_state: Option<StateLocal>,
    options: CompileOptions,
}

impl AppBuilder {
    /// An application with only the default behavior.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs `handler` for no-op calls whose first argument is `name`.
    /// Invocations are matched in registration order.
    ///
    /// # Errors
    ///
    /// * `DuplicateInvocation` - `name` is already registered
    pub fn with_invocation(
        mut self,
        name: impl AsRef<[u8]>,
        handler: Expr,
    ) -> Result<Self, AppError> {
        let name = name.as_ref();
        if self.invocations.iter().any(|(existing, _)| existing == name) {
            return Err(AppError::DuplicateInvocation {
                name: String::from_utf8_lossy(name).into_owned(),
            });
        }
        self.invocations.push((name.to_vec(), handler));
        Ok(self)
    }

    /// Runs after the global defaults when the application is created.
    #[must_use]
    pub fn with_on_create(mut self, handler: Expr) -> Self {
        self.on_create = Some(handler);
        self
    }

    /// Decides `DeleteApplication` calls.
    #[must_use]
    pub fn with_on_delete(mut self, handler: Expr) -> Self {
        self.on_delete = Some(handler);
        self
    }

    /// Decides `UpdateApplication` calls.
    #[must_use]
    pub fn with_on_update(mut self, handler: Expr) -> Self {
        self.on_update = Some(handler);
        self
    }

    /// Runs after the local defaults when an account opts in.
    #[must_use]
    pub fn with_on_opt_in(mut self, handler: Expr) -> Self {
        self.on_opt_in = Some(handler);
        self
    }

    /// Decides `CloseOut` calls.
    #[must_use]
    pub fn with_on_close_out(mut self, handler: Expr) -> Self {
        self.on_close_out = Some(handler);
        self
    }

    /// The clear-state program.
    #[must_use]
    pub fn with_on_clear(mut self, handler: Expr) -> Self {
        self.on_clear = Some(handler);
        self
    }

    /// Runs for no-op calls matching no invocation.
    #[must_use]
    pub fn with_on_no_op(mut self, handler: Expr) -> Self {
        self.on_no_op = Some(handler);
        self
    }

    /// Declares the global state. Its defaults are written on create.
    #[must_use]
    pub fn with_global_state(mut self, state: StateGlobal) -> Self {
        self.global_state = Some(state);
        self
    }

    /// Declares the local state. Its defaults are written on opt in.
    #[must_use]
    pub fn with_local_state(mut self, state: StateLocal) -> Self {
        self.local_state = Some(state);
        self
    }

    /// Sets the program version and other compiler options.
    #[must_use]
    pub fn with_compile_options(mut self, options: CompileOptions) -> Self {
        self.options = options;
        self
    }

    /// Registered invocation names, in match order.
    pub fn invocation_names(&self) -> impl Iterator<Item = &[u8]> {
        self.invocations.iter().map(|(name, _)| name.as_slice())
    }

    /// The declared global state.
    #[must_use]
    pub fn global_state(&self) -> Option<&StateGlobal> {
        self.global_state.as_ref()
    }

    /// The declared local state.
    #[must_use]
    pub fn local_state(&self) -> Option<&StateLocal> {
        self.local_state.as_ref()
    }

    /// Options used to compile both programs.
    #[must_use]
    pub fn compile_options(&self) -> CompileOptions {
        self.options
    }

    // =========================================================================
    // PROGRAMS
    // =========================================================================

    /// Builds the approval program, or the clear-state program when
    /// `for_clear_state` is set.
    ///
    /// # Errors
    ///
    /// Propagates failures of the state constructors.
    pub fn build_program(&self, for_clear_state: bool) -> Result<Expr, AppError> {
        if for_clear_state {
            Ok(self.clear_expr())
        } else {
            self.approval_expr()
        }
    }

    /// The approval program: a dispatcher over the call kind and the first
    /// argument. At most one branch runs.
    ///
    /// # Errors
    ///
    /// See [`AppBuilder::build_program`].
    pub fn approval_expr(&self) -> Result<Expr, AppError> {
        let mut branches = Vec::new();

        let global_defaults = match &self.global_state {
            Some(state) => state.constructor()?,
            None => Expr::Seq(Vec::new()),
        };
        branches.push((
            Txn::application_id().equals(Expr::int(0)),
            with_prelude(global_defaults, self.on_create.as_ref()),
        ));

        if let Some(handler) = &self.on_delete {
            branches.push((
                on_completion_is(OnComplete::DeleteApplication),
                terminated(handler),
            ));
        }
        if let Some(handler) = &self.on_update {
            branches.push((
                on_completion_is(OnComplete::UpdateApplication),
                terminated(handler),
            ));
        }

        let local_defaults = match &self.local_state {
            Some(state) => state.constructor()?,
            None => Expr::Seq(Vec::new()),
        };
        branches.push((
            on_completion_is(OnComplete::OptIn),
            with_prelude(local_defaults, self.on_opt_in.as_ref()),
        ));

        if let Some(handler) = &self.on_close_out {
            branches.push((on_completion_is(OnComplete::CloseOut), terminated(handler)));
        }

        for (name, handler) in &self.invocations {
            let named = Expr::if_then_else(
                Txn::num_app_args().ge(Expr::int(1)),
                Txn::application_args(0).equals(Expr::bytes(name)),
                Expr::int(0),
            );
            branches.push((
                Expr::and([on_completion_is(OnComplete::NoOp), named]),
                terminated(handler),
            ));
        }

        if let Some(handler) = &self.on_no_op {
            branches.push((on_completion_is(OnComplete::NoOp), terminated(handler)));
        }

        branches.push((Expr::int(1), Expr::reject()));

        debug!(
            branches = branches.len(),
            invocations = self.invocations.len(),
            "assembled approval program"
        );
        Ok(Expr::cond(branches))
    }

    /// The clear-state program. Invocations are not reachable from it.
    #[must_use]
    pub fn clear_expr(&self) -> Expr {
        self.on_clear
            .as_ref()
            .map_or_else(Expr::approve, terminated)
    }

    /// TEAL source of the approval program.
    ///
    /// # Errors
    ///
    /// * `Compile` - the program is ill-typed
    pub fn approval_source(&self) -> Result<String, AppError> {
        Ok(compile_expr(&self.approval_expr()?, &self.options)?)
    }

    /// TEAL source of the clear-state program.
    ///
    /// # Errors
    ///
    /// * `Compile` - the program is ill-typed
    pub fn clear_source(&self) -> Result<String, AppError> {
        Ok(compile_expr(&self.clear_expr(), &self.options)?)
    }

    // =========================================================================
    // SCHEMA
    // =========================================================================

    /// Entries reserved in global state.
    #[must_use]
    pub fn global_schema(&self) -> StateSchema {
        self.global_state
            .as_ref()
            .map(State::schema)
            .unwrap_or_default()
    }

    /// Entries reserved in each opted-in account's local state.
    #[must_use]
    pub fn local_schema(&self) -> StateSchema {
        self.local_state
            .as_ref()
            .map(State::schema)
            .unwrap_or_default()
    }

    /// Both schemas, checked against the platform limits.
    ///
    /// # Errors
    ///
    /// * `SchemaOverflow` - more than 64 global or 16 local entries
    pub fn build_schema(&self) -> Result<AppSchema, AppError> {
        let schema = AppSchema {
            global: self.global_schema(),
            local: self.local_schema(),
        };
        check_global_schema(&schema.global)?;
        check_local_schema(&schema.local)?;
        Ok(schema)
    }

    // =========================================================================
    // DEPLOYMENT
    // =========================================================================

    fn compile_programs<C>(&self, compiler: &C) -> Result<(Vec<u8>, Vec<u8>), AppError>
    where
        C: ProgramCompiler + ?Sized,
    {
        let approval = compiler.compile(&self.approval_source()?)?;
        let clear = compiler.compile(&self.clear_source()?)?;
        Ok((approval, clear))
    }

    /// Builds the unsigned transaction creating this application.
    ///
    /// # Arguments
    ///
    /// * `compiler` - Compiles both programs to bytecode
    /// * `sender` - The creator
    /// * `params` - Fee and validity window
    ///
    /// # Errors
    ///
    /// * `SchemaOverflow` - declared state exceeds the platform limits
    /// * `Compile` - a program is ill-typed
    /// * `Service` - the compiler failed; passed through unchanged
    #[instrument(skip(self, compiler, params))]
    pub fn create_txn<C>(
        &self,
        compiler: &C,
        sender: Address,
        params: &SuggestedParams,
    ) -> Result<Transaction, AppError>
    where
        C: ProgramCompiler + ?Sized,
    {
        let schema = self.build_schema()?;
        let (approval, clear) = self.compile_programs(compiler)?;

        info!(
            approval_len = approval.len(),
            clear_len = clear.len(),
            global = schema.global.total(),
            local = schema.local.total(),
            "built application create transaction"
        );
        Ok(
            Transaction::application_call(sender, params, 0, OnComplete::NoOp)
                .with_programs(approval, clear)
                .with_schemas(schema.global, schema.local),
        )
    }

    /// Builds the unsigned transaction replacing the programs of `app_id`.
    /// The schema of a deployed application cannot change, so none is sent.
    ///
    /// # Errors
    ///
    /// * `Compile` - a program is ill-typed
    /// * `Service` - the compiler failed; passed through unchanged
    #[instrument(skip(self, compiler, params))]
    pub fn update_txn<C>(
        &self,
        compiler: &C,
        sender: Address,
        params: &SuggestedParams,
        app_id: u64,
    ) -> Result<Transaction, AppError>
    where
        C: ProgramCompiler + ?Sized,
    {
        let (approval, clear) = self.compile_programs(compiler)?;
        info!(app_id, "built application update transaction");
        Ok(
            Transaction::application_call(sender, params, app_id, OnComplete::UpdateApplication)
                .with_programs(approval, clear),
        )
    }

    /// Fetches the deployed application `app_id`, for use in dry runs.
    ///
    /// # Errors
    ///
    /// * `Service` - the reader failed; passed through unchanged
    #[instrument(skip(self, reader))]
    pub fn build_application<R>(&self, reader: &R, app_id: u64) -> Result<Application, AppError>
    where
        R: ApplicationReader + ?Sized,
    {
        let app = reader.get_application(app_id)?;

        let declared = (self.global_schema(), self.local_schema());
        let deployed = (
            app.params.global_state_schema.unwrap_or_default(),
            app.params.local_state_schema.unwrap_or_default(),
        );
        if declared != deployed {
            warn!(
                app_id,
                ?declared,
                ?deployed,
                "deployed schema differs from declared state"
            );
        }
        Ok(app)
    }

    /// Describes this application as if deployed under `app_id`, with
    /// locally compiled programs. Used to dry-run apps that are not deployed.
    ///
    /// # Errors
    ///
    /// * `SchemaOverflow` - declared state exceeds the platform limits
    /// * `Compile` - a program is ill-typed
    /// * `Service` - the compiler failed; passed through unchanged
    #[instrument(skip(self, compiler, global_state))]
    pub fn compiled_application<C>(
        &self,
        compiler: &C,
        app_id: u64,
        creator: Option<Address>,
        global_state: Vec<TealKeyValue>,
    ) -> Result<Application, AppError>
    where
        C: ProgramCompiler + ?Sized,
    {
        let schema = self.build_schema()?;
        let (approval, clear) = self.compile_programs(compiler)?;
        Ok(Application::new(
            app_id,
            ApplicationParams {
                creator,
                approval_program: Some(approval),
                clear_state_program: Some(clear),
                global_state_schema: Some(schema.global),
                local_state_schema: Some(schema.local),
                global_state,
            },
        ))
    }
}

fn on_completion_is(on_complete: OnComplete) -> Expr {
    Txn::on_completion().equals(on_complete.into())
}

/// A handler yielding a value returns it; anything else runs as written.
fn terminated(handler: &Expr) -> Expr {
    if matches!(handler.type_of(), TealType::Uint64 | TealType::Any) {
        Expr::ret(handler.clone())
    } else {
        handler.clone()
    }
}

/// Default writes, then the handler or approval.
fn with_prelude(defaults: Expr, handler: Option<&Expr>) -> Expr {
    let body = handler.map_or_else(Expr::approve, terminated);
    match defaults {
        Expr::Seq(writes) if writes.is_empty() => body,
        defaults => Expr::seq([defaults, body]),
    }
}
