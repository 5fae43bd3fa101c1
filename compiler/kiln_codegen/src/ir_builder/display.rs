//! Textual dump of a finished body, for tracing and tests.

use std::fmt::Write as _;

use kiln_types::Pool;

use super::{Body, Instr};
use crate::value_id::ValueKind;
use crate::{FunctionTable, ValueId};

impl Body {
    /// Render the body one instruction per line.
    ///
    /// ```text
    /// %7 = alloca int32
    /// lifetime.start %7, 4
    /// store %1, %7
    /// %9 = call runtime.hashmapBinaryGet(%0, %7, %8, undef, null)
    /// ```
    pub fn dump(&self, pool: &Pool, functions: &FunctionTable) -> String {
        let mut out = String::new();
        for inst in &self.instrs {
            if let Some(result) = inst.result {
                let _ = write!(out, "{result} = ");
            }
            let _ = match &inst.instr {
                Instr::ExtractValue { agg, index } => {
                    write!(out, "extractvalue {}, {index}", self.operand(*agg))
                }
                Instr::InsertValue { agg, value, index } => write!(
                    out,
                    "insertvalue {}, {}, {index}",
                    self.operand(*agg),
                    self.operand(*value)
                ),
                Instr::Alloca { ty } => write!(out, "alloca {}", pool.display(*ty)),
                Instr::Store { ptr, value } => {
                    write!(out, "store {}, {}", self.operand(*value), self.operand(*ptr))
                }
                Instr::Load { ptr, ty } => {
                    write!(out, "load {}, {}", pool.display(*ty), self.operand(*ptr))
                }
                Instr::LifetimeStart { ptr, size } => {
                    write!(out, "lifetime.start {}, {size}", self.operand(*ptr))
                }
                Instr::LifetimeEnd { ptr, size } => {
                    write!(out, "lifetime.end {}, {size}", self.operand(*ptr))
                }
                Instr::Call { callee, args } => {
                    let args: Vec<String> = args.iter().map(|&a| self.operand(a)).collect();
                    match functions.decl(*callee) {
                        Some(decl) => write!(out, "call {}({})", decl.name, args.join(", ")),
                        None => write!(out, "call <fn#{}>({})", callee.raw(), args.join(", ")),
                    }
                }
                Instr::Ret(None) => write!(out, "ret void"),
                Instr::Ret(Some(value)) => write!(out, "ret {}", self.operand(*value)),
            };
            out.push('\n');
        }
        out
    }

    /// Constants render inline; everything else by ID.
    fn operand(&self, value: ValueId) -> String {
        match self.values.get(value).map(|data| &data.kind) {
            Ok(ValueKind::Undef) => "undef".to_owned(),
            Ok(ValueKind::Null) => "null".to_owned(),
            Ok(ValueKind::Zero) => "zeroinitializer".to_owned(),
            Ok(ValueKind::ConstInt(bits)) => bits.to_string(),
            Ok(ValueKind::ConstBool(b)) => b.to_string(),
            Ok(ValueKind::ConstStr(s)) => format!("{s:?}"),
            Ok(ValueKind::Param(_) | ValueKind::Instr(_)) | Err(_) => value.to_string(),
        }
    }
}
