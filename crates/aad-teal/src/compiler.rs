//! # TEAL Compiler
//!
//! Lowers an [`Expr`] tree to TEAL assembly source. Control flow uses
//! generated labels (`l0`, `l1`, ...); scratch slots are numbered in order
//! of first use.

use std::collections::HashMap;
use std::fmt;

use tracing::debug;

use crate::errors::CompileError;
use crate::expr::{BinaryOp, Expr, StateOp};
use crate::scratch::{MaybeValue, ScratchSlot};
use crate::types::TealType;

/// Program version emitted when none is requested.
pub const DEFAULT_VERSION: u8 = 5;

/// Newest program version this compiler targets.
pub const MAX_VERSION: u8 = 6;

/// Oldest program version with application state opcodes.
pub const MIN_VERSION: u8 = 2;

/// Number of scratch slots the evaluator provides.
pub const MAX_SCRATCH_SLOTS: usize = 256;

/// Compiler settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompileOptions {
    /// Value of `#pragma version`.
    pub version: u8,
}

impl CompileOptions {
    /// Options targeting `version`.
    #[must_use]
    pub const fn new(version: u8) -> Self {
        Self { version }
    }
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self::new(DEFAULT_VERSION)
    }
}

/// One line of TEAL source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Line {
    /// An opcode with its immediate arguments.
    Op {
        opcode: &'static str,
        immediates: Vec<String>,
    },
    /// A branch target.
    Label(String),
}

impl fmt::Display for Line {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Op { opcode, immediates } => {
                f.write_str(opcode)?;
                for immediate in immediates {
                    write!(f, " {immediate}")?;
                }
                Ok(())
            }
            Self::Label(name) => write!(f, "{name}:"),
        }
    }
}

/// Compiles `expr` to TEAL source, starting with `#pragma version`.
///
/// The program must have type `Uint64` (its value is the result) or `None`
/// (it ends through `Return` or `Err`).
///
/// # Errors
///
/// * `TypeMismatch` - an operand or statement has the wrong static type
/// * `ScratchSpaceExhausted` - more than 256 distinct slots are used
/// * `InvalidArgument` - an unsupported version or malformed tree
pub fn compile_expr(expr: &Expr, options: &CompileOptions) -> Result<String, CompileError> {
    let lines = compile_lines(expr, options)?;

    let mut source = format!("#pragma version {}", options.version);
    for line in &lines {
        source.push('\n');
        source.push_str(&line.to_string());
    }

    debug!(
        version = options.version,
        lines = lines.len(),
        "compiled expression to TEAL"
    );
    Ok(source)
}

/// Compiles `expr` to a list of lines, without the version pragma.
///
/// # Errors
///
/// See [`compile_expr`].
pub fn compile_lines(expr: &Expr, options: &CompileOptions) -> Result<Vec<Line>, CompileError> {
    if !(MIN_VERSION..=MAX_VERSION).contains(&options.version) {
        return Err(CompileError::InvalidArgument(format!(
            "unsupported program version {} (expected {MIN_VERSION}..={MAX_VERSION})",
            options.version
        )));
    }

    let program_type = expr.type_of();
    if !matches!(program_type, TealType::Uint64 | TealType::None) {
        return Err(CompileError::TypeMismatch {
            expected: TealType::Uint64,
            actual: program_type,
            context: "program".into(),
        });
    }

    let mut compiler = Compiler::new(*options);
    compiler.compile(expr)?;
    Ok(compiler.lines)
}

struct Compiler {
    options: CompileOptions,
    lines: Vec<Line>,
    slots: HashMap<ScratchSlot, usize>,
    next_label: usize,
}

impl Compiler {
    fn new(options: CompileOptions) -> Self {
        Self {
            options,
            lines: Vec::new(),
            slots: HashMap::new(),
            next_label: 0,
        }
    }

    fn emit(&mut self, opcode: &'static str, immediates: Vec<String>) {
        self.lines.push(Line::Op { opcode, immediates });
    }

    fn op(&mut self, opcode: &'static str) {
        self.emit(opcode, Vec::new());
    }

    fn label(&mut self) -> String {
        let name = format!("l{}", self.next_label);
        self.next_label += 1;
        name
    }

    fn place(&mut self, label: String) {
        self.lines.push(Line::Label(label));
    }

    fn slot_index(&mut self, slot: ScratchSlot) -> Result<usize, CompileError> {
        if let Some(index) = self.slots.get(&slot) {
            return Ok(*index);
        }
        let index = self.slots.len();
        if index >= MAX_SCRATCH_SLOTS {
            return Err(CompileError::ScratchSpaceExhausted {
                max: MAX_SCRATCH_SLOTS,
            });
        }
        self.slots.insert(slot, index);
        Ok(index)
    }

    fn require_version(&self, min: u8, what: &str) -> Result<(), CompileError> {
        if self.options.version < min {
            return Err(CompileError::InvalidArgument(format!(
                "{what} requires program version {min}, targeting {}",
                self.options.version
            )));
        }
        Ok(())
    }

    /// Compiles `expr` after checking it has a type compatible with `expected`.
    fn expect(&mut self, expr: &Expr, expected: TealType, context: &str) -> Result<(), CompileError> {
        let actual = expr.type_of();
        if !expected.accepts(actual) {
            return Err(CompileError::TypeMismatch {
                expected,
                actual,
                context: context.to_string(),
            });
        }
        self.compile(expr)
    }

    fn compile(&mut self, expr: &Expr) -> Result<(), CompileError> {
        match expr {
            Expr::Int(value) => self.emit("int", vec![value.to_string()]),
            Expr::OnComplete(on_complete) => self.emit("int", vec![on_complete.name().to_string()]),
            Expr::Bytes(value) => {
                let literal = if value.is_empty() {
                    "\"\"".to_string()
                } else {
                    format!("0x{}", hex::encode(value))
                };
                self.emit("byte", vec![literal]);
            }
            Expr::Addr(address) => self.emit("addr", vec![address.to_string()]),
            Expr::Txn(field) => self.emit("txn", vec![field.name().to_string()]),
            Expr::TxnArray(field, index) => {
                self.emit("txna", vec![field.name().to_string(), index.to_string()]);
            }
            Expr::Global(field) => {
                self.require_version(field.min_version(), field.name())?;
                self.emit("global", vec![field.name().to_string()]);
            }
            Expr::Unary(op, operand) => {
                self.expect(operand, op.operand_type(), op.opcode())?;
                self.op(op.opcode());
            }
            Expr::Binary(op, lhs, rhs) => self.compile_binary(*op, lhs, rhs)?,
            Expr::Logical(op, operands) => {
                let (first, rest) = operands.split_first().ok_or_else(|| {
                    CompileError::InvalidArgument(format!("{} needs an operand", op.opcode()))
                })?;
                self.expect(first, TealType::Uint64, op.opcode())?;
                for operand in rest {
                    self.expect(operand, TealType::Uint64, op.opcode())?;
                    self.op(op.opcode());
                }
            }
            Expr::Seq(items) => {
                let last = items.len().saturating_sub(1);
                for (i, item) in items.iter().enumerate() {
                    if i == last {
                        self.compile(item)?;
                    } else {
                        self.expect(item, TealType::None, "sequence statement")?;
                    }
                }
            }
            Expr::If {
                cond,
                then,
                otherwise,
            } => self.compile_if(cond, then, otherwise.as_deref())?,
            Expr::Cond(branches) => self.compile_cond(branches)?,
            Expr::Return(value) => {
                self.expect(value, TealType::Uint64, "return")?;
                self.op("return");
            }
            Expr::Assert(cond) => {
                self.require_version(3, "assert")?;
                self.expect(cond, TealType::Uint64, "assert")?;
                self.op("assert");
            }
            Expr::Err => self.op("err"),
            Expr::Pop(value) => {
                self.expect(value, TealType::Any, "pop")?;
                self.op("pop");
            }
            Expr::State(op) => self.compile_state(op)?,
            Expr::Store(slot, value) => {
                self.expect(value, TealType::Any, "store")?;
                let index = self.slot_index(*slot)?;
                self.emit("store", vec![index.to_string()]);
            }
            Expr::Load(slot, _) => {
                let index = self.slot_index(*slot)?;
                self.emit("load", vec![index.to_string()]);
            }
            Expr::MaybeStore(maybe) => self.compile_maybe_store(maybe)?,
        }
        Ok(())
    }

    fn compile_binary(&mut self, op: BinaryOp, lhs: &Expr, rhs: &Expr) -> Result<(), CompileError> {
        match op {
            BinaryOp::Eq | BinaryOp::Neq => {
                let lhs_type = lhs.type_of();
                self.expect(lhs, TealType::Any, op.opcode())?;
                self.expect(rhs, lhs_type, op.opcode())?;
            }
            _ => {
                self.expect(lhs, op.operand_type(), op.opcode())?;
                self.expect(rhs, op.operand_type(), op.opcode())?;
            }
        }
        self.op(op.opcode());
        Ok(())
    }

    fn compile_if(
        &mut self,
        cond: &Expr,
        then: &Expr,
        otherwise: Option<&Expr>,
    ) -> Result<(), CompileError> {
        self.expect(cond, TealType::Uint64, "if condition")?;
        let end = self.label();

        match otherwise {
            Some(otherwise) => {
                let then_type = then.type_of();
                let other = self.label();
                self.emit("bz", vec![other.clone()]);
                self.compile(then)?;
                self.emit("b", vec![end.clone()]);
                self.place(other);
                self.expect(otherwise, then_type, "else branch")?;
            }
            None => {
                self.emit("bz", vec![end.clone()]);
                self.expect(then, TealType::None, "if without else")?;
            }
        }

        self.place(end);
        Ok(())
    }

    fn compile_cond(&mut self, branches: &[(Expr, Expr)]) -> Result<(), CompileError> {
        let Some((_, first_body)) = branches.first() else {
            return Err(CompileError::InvalidArgument(
                "cond needs at least one branch".into(),
            ));
        };
        let body_type = first_body.type_of();

        let labels: Vec<String> = branches.iter().map(|_| self.label()).collect();
        let end = self.label();

        for ((cond, _), label) in branches.iter().zip(&labels) {
            self.expect(cond, TealType::Uint64, "cond condition")?;
            self.emit("bnz", vec![label.clone()]);
        }
        self.op("err");

        for ((_, body), label) in branches.iter().zip(labels) {
            self.place(label);
            self.expect(body, body_type, "cond branch")?;
            self.emit("b", vec![end.clone()]);
        }

        self.place(end);
        Ok(())
    }

    fn compile_state(&mut self, op: &StateOp) -> Result<(), CompileError> {
        if op.is_maybe() {
            return Err(CompileError::InvalidArgument(format!(
                "{} leaves two values; use it through MaybeValue",
                op.opcode()
            )));
        }
        self.compile_state_operands(op)?;
        self.op(op.opcode());
        Ok(())
    }

    fn compile_state_operands(&mut self, op: &StateOp) -> Result<(), CompileError> {
        for (operand, expected) in op.operands() {
            self.expect(operand, expected, op.opcode())?;
        }
        Ok(())
    }

    fn compile_maybe_store(&mut self, maybe: &MaybeValue) -> Result<(), CompileError> {
        let op = maybe.op();
        if !op.is_maybe() {
            return Err(CompileError::InvalidArgument(format!(
                "{} does not push an existence flag",
                op.opcode()
            )));
        }
        self.compile_state_operands(op)?;
        self.op(op.opcode());

        // The flag is on top of the value.
        let has_value = self.slot_index(maybe.has_value_slot())?;
        self.emit("store", vec![has_value.to_string()]);
        let value = self.slot_index(maybe.value_slot())?;
        self.emit("store", vec![value.to_string()]);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtins::{App, Global, Txn};
    use crate::expr::LogicalOp;
    use aad_types::{Address, OnComplete};

    fn compile(expr: &Expr) -> String {
        compile_expr(expr, &CompileOptions::default()).unwrap()
    }

    #[test]
    fn test_constant_program() {
        assert_eq!(compile(&Expr::int(1)), "#pragma version 5\nint 1");
    }

    #[test]
    fn test_counter_increment() {
        let expr = Expr::seq([
            App::global_put("counter", App::global_get("counter") + Expr::int(1)),
            Expr::approve(),
        ]);
        assert_eq!(
            compile(&expr),
            "#pragma version 5\n\
             byte 0x636f756e746572\n\
             byte 0x636f756e746572\n\
             app_global_get\n\
             int 1\n\
             +\n\
             app_global_put\n\
             int 1\n\
             return"
        );
    }

    #[test]
    fn test_literals() {
        let expr = Expr::seq([
            Expr::pop(Expr::bytes("")),
            Expr::pop(Expr::addr(Address::ZERO)),
            Expr::pop(Expr::from(OnComplete::OptIn)),
            Expr::int(1),
        ]);
        let source = compile(&expr);
        assert!(source.contains("byte \"\"\n"));
        assert!(source.contains(&format!("addr {}", Address::ZERO)));
        assert!(source.contains("int OptIn"));
    }

    #[test]
    fn test_if_else_labels() {
        let expr = Expr::if_then_else(Txn::num_app_args(), Expr::int(1), Expr::int(2));
        assert_eq!(
            compile(&expr),
            "#pragma version 5\n\
             txn NumAppArgs\n\
             bz l1\n\
             int 1\n\
             b l0\n\
             l1:\n\
             int 2\n\
             l0:"
        );
    }

    #[test]
    fn test_cond_layout() {
        let expr = Expr::cond([
            (Txn::application_id().equals(Expr::int(0)), Expr::approve()),
            (Expr::int(1), Expr::reject()),
        ]);
        let lines: Vec<String> = compile_lines(&expr, &CompileOptions::default())
            .unwrap()
            .iter()
            .map(ToString::to_string)
            .collect();
        assert_eq!(
            lines,
            vec![
                "txn ApplicationID",
                "int 0",
                "==",
                "bnz l0",
                "int 1",
                "bnz l1",
                "err",
                "l0:",
                "int 1",
                "return",
                "b l2",
                "l1:",
                "int 0",
                "return",
                "b l2",
                "l2:",
            ]
        );
    }

    #[test]
    fn test_maybe_value_slots() {
        let maybe = App::global_get_ex(Global::current_application_id(), "k");
        let expr = Expr::seq([maybe.store(), maybe.has_value()]);
        let source = compile(&expr);
        assert!(source.ends_with(
            "global CurrentApplicationID\n\
             byte 0x6b\n\
             app_global_get_ex\n\
             store 0\n\
             store 1\n\
             load 0"
        ));
    }

    #[test]
    fn test_slots_numbered_by_first_use() {
        let a = ScratchSlot::new();
        let b = ScratchSlot::new();
        // b is used first.
        let expr = Expr::seq([
            b.store(Expr::int(1)),
            a.store(Expr::int(2)),
            a.load(TealType::Uint64) + b.load(TealType::Uint64),
        ]);
        let source = compile(&expr);
        assert!(source.contains("int 1\nstore 0\nint 2\nstore 1\nload 1\nload 0"));
    }

    #[test]
    fn test_scratch_space_exhausted() {
        let mut items: Vec<Expr> = (0..=MAX_SCRATCH_SLOTS)
            .map(|_| ScratchSlot::new().store(Expr::int(0)))
            .collect();
        items.push(Expr::int(1));
        assert_eq!(
            compile_expr(&Expr::Seq(items), &CompileOptions::default()),
            Err(CompileError::ScratchSpaceExhausted {
                max: MAX_SCRATCH_SLOTS
            })
        );
    }

    #[test]
    fn test_return_bytes_rejected() {
        let result = compile_expr(&Expr::ret(Expr::bytes("x")), &CompileOptions::default());
        assert!(matches!(
            result,
            Err(CompileError::TypeMismatch {
                expected: TealType::Uint64,
                actual: TealType::Bytes,
                ..
            })
        ));
    }

    #[test]
    fn test_seq_intermediate_must_be_none() {
        let expr = Expr::seq([Expr::int(1), Expr::int(2)]);
        assert!(matches!(
            compile_expr(&expr, &CompileOptions::default()),
            Err(CompileError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_eq_operands_must_agree() {
        let expr = Expr::int(1).equals(Expr::bytes("1"));
        assert!(compile_expr(&expr, &CompileOptions::default()).is_err());

        let untyped = App::global_get("k").equals(Expr::bytes("v"));
        assert!(compile_expr(&untyped, &CompileOptions::default()).is_ok());
    }

    #[test]
    fn test_bare_get_ex_rejected() {
        let maybe = App::global_get_ex(Expr::int(0), "k");
        let expr = Expr::seq([Expr::State(maybe.op().clone()), Expr::int(1)]);
        assert!(matches!(
            compile_expr(&expr, &CompileOptions::default()),
            Err(CompileError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_version_checks() {
        assert!(compile_expr(&Expr::int(1), &CompileOptions::new(1)).is_err());
        assert!(compile_expr(&Expr::int(1), &CompileOptions::new(7)).is_err());
        let assert = Expr::seq([Expr::assert(Expr::int(1)), Expr::int(1)]);
        assert!(compile_expr(&assert, &CompileOptions::new(2)).is_err());
        assert!(compile_expr(&assert, &CompileOptions::new(3)).is_ok());
    }

    #[test]
    fn test_empty_logical_rejected() {
        assert!(matches!(
            compile_expr(
                &Expr::Logical(LogicalOp::And, Vec::new()),
                &CompileOptions::default()
            ),
            Err(CompileError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_bytes_program_rejected() {
        assert!(compile_expr(&Expr::bytes("x"), &CompileOptions::default()).is_err());
    }

    proptest::proptest! {
        #[test]
        fn prop_integer_sum_compiles_operands_in_order(a in proptest::num::u64::ANY, b in proptest::num::u64::ANY) {
            let source = compile(&(Expr::int(a) + Expr::int(b)));
            proptest::prop_assert_eq!(source, format!("#pragma version 5\nint {a}\nint {b}\n+"));
        }
    }
}
