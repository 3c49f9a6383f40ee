use brisk_core::{BinaryOp, Code, Function, Instruction, Literal, Program, Type};
use serde_json::Value;
use tracing::trace;

use crate::{
    wire::{RawFunction, RawInstr, RawProgram},
    Location, ParseError, Result,
};

pub fn decode_program(raw: RawProgram) -> Result<Program> {
    let functions = raw
        .functions
        .ok_or_else(|| ParseError::schema(Location::program(), "missing `functions` array"))?;

    functions
        .into_iter()
        .enumerate()
        .map(|(position, function)| decode_function(position, function))
        .collect::<Result<Vec<_>>>()
        .map(Program::new)
}

/// `position` is only used to name a function that has no usable name.
pub fn decode_function(position: usize, raw: RawFunction) -> Result<Function> {
    let name = match raw.name {
        Some(name) if !name.is_empty() => name,
        Some(_) => {
            return Err(ParseError::schema(
                Location::program(),
                format!("function #{} has an empty `name`", position),
            ))
        }
        None => {
            return Err(ParseError::schema(
                Location::program(),
                format!("function #{} is missing `name`", position),
            ))
        }
    };
    let instrs = raw
        .instrs
        .ok_or_else(|| ParseError::schema(Location::function(&name), "missing `instrs` array"))?;

    let code = instrs
        .into_iter()
        .enumerate()
        .map(|(index, instr)| decode_code(&name, index, instr))
        .collect::<Result<Vec<_>>>()?;

    trace!(function = %name, entries = code.len(), "decoded function");
    Ok(Function::new(name, code))
}

pub fn decode_code(function: &str, index: usize, raw: RawInstr) -> Result<Code> {
    let location = Location::instruction(function, index);

    if let Some(label) = raw.label {
        if raw.op.is_some() {
            return Err(ParseError::schema(
                location,
                format!("label `{}` also carries an `op`", label),
            ));
        }
        if label.is_empty() {
            return Err(ParseError::schema(location, "label is empty"));
        }
        return Ok(Code::label(label));
    }

    let Some(op) = raw.op.clone() else {
        return Err(ParseError::schema(location, "missing `op`"));
    };
    let kind = OpKind::from_name(&op).ok_or_else(|| ParseError::UnsupportedOperation {
        location: location.clone(),
        op: op.clone(),
    })?;

    let reader = InstrReader { op, location, raw };
    reader.decode(kind).map(Code::from)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OpKind {
    Const,
    Binary(BinaryOp),
    Not,
    Id,
    Jump,
    Branch,
    Return,
    Print,
    Nop,
}

impl OpKind {
    fn from_name(name: &str) -> Option<Self> {
        let kind = match name {
            "const" => OpKind::Const,
            "not" => OpKind::Not,
            "id" => OpKind::Id,
            "jmp" => OpKind::Jump,
            "br" => OpKind::Branch,
            "ret" => OpKind::Return,
            "print" => OpKind::Print,
            "nop" => OpKind::Nop,
            other => OpKind::Binary(BinaryOp::from_name(other)?),
        };
        Some(kind)
    }
}

struct InstrReader {
    op: String,
    location: Location,
    raw: RawInstr,
}

impl InstrReader {
    fn decode(self, kind: OpKind) -> Result<Instruction> {
        let declared = self.declared_type()?;

        let inst = match kind {
            OpKind::Const => {
                let [] = self.args::<0>()?;
                let ty = declared.ok_or_else(|| self.error("`const` requires a `type`"))?;
                Instruction::Const {
                    dest: self.dest()?,
                    ty,
                    value: self.literal(ty)?,
                }
            }
            OpKind::Binary(op) => {
                let [lhs, rhs] = self.args::<2>()?;
                Instruction::Binary {
                    op,
                    dest: self.dest()?,
                    lhs,
                    rhs,
                }
            }
            OpKind::Not => {
                let [arg] = self.args::<1>()?;
                Instruction::Not {
                    dest: self.dest()?,
                    arg,
                }
            }
            OpKind::Id => {
                let [arg] = self.args::<1>()?;
                Instruction::Id {
                    dest: self.dest()?,
                    arg,
                }
            }
            OpKind::Jump => {
                let ([], [target]) = self.args_and_labels::<0, 1>()?;
                Instruction::Jump { target }
            }
            OpKind::Branch => {
                let ([cond], [then_label, else_label]) = self.args_and_labels::<1, 2>()?;
                Instruction::Branch {
                    cond,
                    then_label,
                    else_label,
                }
            }
            OpKind::Return => {
                let [] = self.args::<0>()?;
                Instruction::Return
            }
            OpKind::Print => {
                let [arg] = self.args::<1>()?;
                Instruction::Print { arg }
            }
            OpKind::Nop => {
                let [] = self.args::<0>()?;
                Instruction::Nop
            }
        };
        Ok(inst)
    }

    fn error(&self, message: impl Into<String>) -> ParseError {
        ParseError::schema(self.location.clone(), message)
    }

    /// `type`, when present, must name a supported type whatever the op.
    fn declared_type(&self) -> Result<Option<Type>> {
        match self.raw.ty.as_deref() {
            None => Ok(None),
            Some(name) => Type::from_name(name)
                .map(Some)
                .ok_or_else(|| self.error(format!("unknown type `{}`", name))),
        }
    }

    fn dest(&self) -> Result<String> {
        match self.raw.dest.as_deref() {
            Some("") => Err(self.error("`dest` is empty")),
            Some(dest) => Ok(dest.to_string()),
            None => Err(self.error(format!("`{}` requires a `dest`", self.op))),
        }
    }

    fn literal(&self, ty: Type) -> Result<Literal> {
        let Some(value) = &self.raw.value else {
            return Err(self.error("`const` requires a `value`"));
        };
        match (ty, value) {
            (Type::Int, Value::Number(n)) => n
                .as_i64()
                .map(Literal::Int)
                .ok_or_else(|| self.error(format!("`{}` is not a 64-bit signed integer", n))),
            (Type::Bool, Value::Bool(b)) => Ok(Literal::Bool(*b)),
            (ty, value) => Err(self.error(format!("`{}` is not a valid {} value", value, ty))),
        }
    }

    fn args<const N: usize>(&self) -> Result<[String; N]> {
        self.exact(self.raw.args.clone().unwrap_or_default(), "argument")
    }

    /// Operands plus jump targets. Targets come from `labels` when present, otherwise they
    /// trail the operands in `args`.
    fn args_and_labels<const A: usize, const L: usize>(
        &self,
    ) -> Result<([String; A], [String; L])> {
        let mut args = self.raw.args.clone().unwrap_or_default();
        let labels = match &self.raw.labels {
            Some(labels) => labels.clone(),
            None if args.len() == A + L => args.split_off(A),
            None => {
                return Err(self.error(format!(
                    "`{}` takes {} argument(s), got {}",
                    self.op,
                    A + L,
                    args.len()
                )))
            }
        };
        if labels.iter().any(String::is_empty) {
            return Err(self.error("jump target is empty"));
        }
        Ok((self.exact(args, "argument")?, self.exact(labels, "label")?))
    }

    fn exact<const N: usize>(&self, items: Vec<String>, what: &str) -> Result<[String; N]> {
        let count = items.len();
        <[String; N]>::try_from(items).map_err(|_| {
            self.error(format!(
                "`{}` takes {} {}(s), got {}",
                self.op, N, what, count
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn decode(value: Value) -> Result<Code> {
        let raw: RawInstr = serde_json::from_value(value).unwrap();
        decode_code("main", 0, raw)
    }

    fn schema_message(err: ParseError) -> String {
        match err {
            ParseError::Schema { message, .. } => message,
            other => panic!("expected a schema error, got {other:?}"),
        }
    }

    #[test]
    fn test_label() {
        assert_eq!(decode(json!({ "label": "L1" })).unwrap(), Code::label("L1"));
    }

    #[test]
    fn test_empty_label_rejected() {
        let err = decode(json!({ "label": "" })).unwrap_err();
        assert_eq!(schema_message(err), "label is empty");
    }

    #[test]
    fn test_bool_const() {
        let code = decode(json!({ "op": "const", "dest": "t", "type": "bool", "value": true }));
        assert_eq!(
            code.unwrap(),
            Code::from(Instruction::Const {
                dest: "t".into(),
                ty: Type::Bool,
                value: Literal::Bool(true),
            })
        );
    }

    #[test]
    fn test_negative_int_const() {
        let code = decode(json!({ "op": "const", "dest": "n", "type": "int", "value": -17 }));
        assert_eq!(
            code.unwrap(),
            Code::from(Instruction::Const {
                dest: "n".into(),
                ty: Type::Int,
                value: Literal::Int(-17),
            })
        );
    }

    #[test]
    fn test_const_value_must_match_type() {
        let err = decode(json!({ "op": "const", "dest": "x", "type": "bool", "value": 1 }));
        assert_eq!(schema_message(err.unwrap_err()), "`1` is not a valid bool value");

        let err = decode(json!({ "op": "const", "dest": "x", "type": "int", "value": 1.5 }));
        assert!(schema_message(err.unwrap_err()).contains("not a 64-bit signed integer"));

        let err = decode(json!({ "op": "const", "dest": "x", "type": "int", "value": u64::MAX }));
        assert!(schema_message(err.unwrap_err()).contains("not a 64-bit signed integer"));
    }

    #[test]
    fn test_const_requires_type_dest_and_value() {
        let err = decode(json!({ "op": "const", "dest": "x", "value": 1 })).unwrap_err();
        assert_eq!(schema_message(err), "`const` requires a `type`");

        let err = decode(json!({ "op": "const", "type": "int", "value": 1 })).unwrap_err();
        assert_eq!(schema_message(err), "`const` requires a `dest`");

        let err = decode(json!({ "op": "const", "dest": "x", "type": "int" })).unwrap_err();
        assert_eq!(schema_message(err), "`const` requires a `value`");
    }

    #[test]
    fn test_unknown_type_rejected() {
        let err = decode(json!({ "op": "add", "dest": "x", "type": "float", "args": ["a", "b"] }));
        assert_eq!(schema_message(err.unwrap_err()), "unknown type `float`");
    }

    #[test]
    fn test_missing_op() {
        let err = decode(json!({ "dest": "x" })).unwrap_err();
        assert_eq!(schema_message(err), "missing `op`");
    }

    #[test]
    fn test_unsupported_operation() {
        let err = decode(json!({ "op": "fadd", "dest": "x", "args": ["a", "b"] })).unwrap_err();
        match err {
            ParseError::UnsupportedOperation { location, op } => {
                assert_eq!(op, "fadd");
                assert_eq!(location, Location::instruction("main", 0));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_every_binary_op_decodes() {
        for op in BinaryOp::ALL {
            let code = decode(json!({ "op": op.name(), "dest": "r", "args": ["a", "b"] }));
            assert_eq!(
                code.unwrap(),
                Code::from(Instruction::Binary {
                    op,
                    dest: "r".into(),
                    lhs: "a".into(),
                    rhs: "b".into(),
                })
            );
        }
    }

    #[test]
    fn test_argument_counts_enforced() {
        let cases = [
            json!({ "op": "add", "dest": "x", "args": ["a"] }),
            json!({ "op": "not", "dest": "x", "args": ["a", "b"] }),
            json!({ "op": "id", "dest": "x" }),
            json!({ "op": "print", "args": [] }),
            json!({ "op": "print", "args": ["a", "b"] }),
            json!({ "op": "ret", "args": ["a"] }),
            json!({ "op": "nop", "args": ["a", "b"] }),
            json!({ "op": "const", "dest": "x", "type": "int", "value": 1, "args": ["a"] }),
            json!({ "op": "jmp", "args": [] }),
            json!({ "op": "br", "args": ["c", "L1"] }),
        ];
        for case in cases {
            let err = decode(case.clone()).unwrap_err();
            assert!(
                schema_message(err).contains("argument"),
                "accepted {case}"
            );
        }
    }

    #[test]
    fn test_value_ops_require_dest() {
        for op in ["add", "not", "id"] {
            let args = if op == "add" { json!(["a", "b"]) } else { json!(["a"]) };
            let err = decode(json!({ "op": op, "args": args })).unwrap_err();
            assert_eq!(schema_message(err), format!("`{}` requires a `dest`", op));
        }
    }

    #[test]
    fn test_jumps_with_flat_args() {
        assert_eq!(
            decode(json!({ "op": "jmp", "args": ["L3"] })).unwrap(),
            Code::from(Instruction::Jump {
                target: "L3".into()
            })
        );
        assert_eq!(
            decode(json!({ "op": "br", "args": ["x", "L1", "L2"] })).unwrap(),
            Code::from(Instruction::Branch {
                cond: "x".into(),
                then_label: "L1".into(),
                else_label: "L2".into(),
            })
        );
    }

    #[test]
    fn test_jumps_with_labels_field() {
        assert_eq!(
            decode(json!({ "op": "jmp", "labels": ["L3"] })).unwrap(),
            Code::from(Instruction::Jump {
                target: "L3".into()
            })
        );
        assert_eq!(
            decode(json!({ "op": "br", "args": ["x"], "labels": ["L1", "L2"] })).unwrap(),
            Code::from(Instruction::Branch {
                cond: "x".into(),
                then_label: "L1".into(),
                else_label: "L2".into(),
            })
        );

        let err = decode(json!({ "op": "br", "args": ["x"], "labels": ["L1"] })).unwrap_err();
        assert_eq!(schema_message(err), "`br` takes 2 label(s), got 1");
    }

    #[test]
    fn test_empty_jump_target_rejected() {
        let err = decode(json!({ "op": "jmp", "args": [""] })).unwrap_err();
        assert_eq!(schema_message(err), "jump target is empty");
    }

    #[test]
    fn test_label_with_op_rejected() {
        let err = decode(json!({ "label": "L1", "op": "nop" })).unwrap_err();
        assert_eq!(schema_message(err), "label `L1` also carries an `op`");
    }

    #[test]
    fn test_unknown_fields_ignored() {
        let code = decode(json!({ "op": "nop", "pos": { "row": 1, "col": 2 }, "funcs": [] }));
        assert_eq!(code.unwrap(), Code::from(Instruction::Nop));
    }

    #[test]
    fn test_function_requires_name_and_instrs() {
        let unnamed = serde_json::from_value(json!({ "functions": [{ "instrs": [] }] })).unwrap();
        let err = decode_program(unnamed).unwrap_err();
        assert_eq!(schema_message(err), "function #0 is missing `name`");

        let no_instrs = serde_json::from_value(json!({ "functions": [{ "name": "f" }] })).unwrap();
        let err = decode_program(no_instrs).unwrap_err();
        match err {
            ParseError::Schema { location, message } => {
                assert_eq!(location, Location::function("f"));
                assert_eq!(message, "missing `instrs` array");
            }
            other => panic!("unexpected {other:?}"),
        }

        let err = decode_program(RawProgram::default()).unwrap_err();
        assert_eq!(schema_message(err), "missing `functions` array");
    }

    #[test]
    fn test_error_names_function_and_index() {
        let raw = serde_json::from_value(json!({
            "functions": [
                { "name": "main", "instrs": [] },
                { "name": "helper", "instrs": [{ "op": "nop" }, { "op": "print" }] }
            ]
        }))
        .unwrap();

        let err = decode_program(raw).unwrap_err();
        assert_eq!(err.location(), Some(&Location::instruction("helper", 1)));
    }
}
