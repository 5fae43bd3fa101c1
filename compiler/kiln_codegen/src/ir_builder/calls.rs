//! Call and return operations for `IrBuilder`.

use smallvec::SmallVec;

use super::{Instr, IrBuilder};
use crate::function_table::FunctionDecl;
use crate::{CodegenResult, FunctionId, InternalError, ValueId};

impl IrBuilder<'_> {
    /// Build a direct call with already-expanded native arguments.
    ///
    /// Returns `None` for functions without a result.
    pub fn call(
        &mut self,
        callee: FunctionId,
        decl: &FunctionDecl,
        args: &[ValueId],
    ) -> CodegenResult<Option<ValueId>> {
        if args.len() != decl.native_params.len() {
            return Err(InternalError::ArgumentCountMismatch {
                callee: decl.name.clone(),
                expected: decl.native_params.len(),
                found: args.len(),
            });
        }
        for &arg in args {
            self.check(arg)?;
        }
        let instr = Instr::Call {
            callee,
            args: SmallVec::from_slice(args),
        };
        Ok(match decl.ret {
            Some(ty) => Some(self.push_value_instr(instr, ty)),
            None => {
                self.push_void_instr(instr);
                None
            }
        })
    }

    /// Return from the function.
    pub fn ret(&mut self, value: Option<ValueId>) -> CodegenResult<()> {
        if let Some(value) = value {
            self.check(value)?;
        }
        self.push_void_instr(Instr::Ret(value));
        Ok(())
    }
}
