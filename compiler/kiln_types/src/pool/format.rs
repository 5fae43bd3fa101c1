//! Source-syntax rendering of types, used in diagnostics.

use std::fmt::Write as _;

use super::{Pool, TypeData};
use crate::Idx;

impl Pool {
    /// Render `idx` the way it is spelled in source.
    ///
    /// Named types render as their name; everything else is spelled out
    /// structurally (`struct{x int32; y interface{}}`).
    pub fn display(&self, idx: Idx) -> String {
        let mut out = String::new();
        self.format_into(idx, &mut out);
        out
    }

    fn format_into(&self, idx: Idx, out: &mut String) {
        if idx.is_none() {
            out.push_str("<none>");
            return;
        }
        if let Some(name) = idx.name() {
            out.push_str(name);
            return;
        }
        match &self.item(idx).data {
            TypeData::Primitive(tag) => {
                let _ = write!(out, "{tag}");
            }
            TypeData::Pointer(elem) => {
                out.push('*');
                self.format_into(*elem, out);
            }
            TypeData::Array { elem, len } => {
                let _ = write!(out, "[{len}]");
                self.format_into(*elem, out);
            }
            TypeData::Slice(elem) => {
                out.push_str("[]");
                self.format_into(*elem, out);
            }
            TypeData::Map { key, value } => {
                out.push_str("map[");
                self.format_into(*key, out);
                out.push(']');
                self.format_into(*value, out);
            }
            TypeData::Func { params, results } => {
                out.push_str("func(");
                self.format_list(params, out);
                out.push(')');
                match results.len() {
                    0 => {}
                    1 => {
                        out.push(' ');
                        self.format_into(results[0], out);
                    }
                    _ => {
                        out.push_str(" (");
                        self.format_list(results, out);
                        out.push(')');
                    }
                }
            }
            TypeData::Struct(fields) => {
                out.push_str("struct{");
                for (i, field) in fields.iter().enumerate() {
                    if i > 0 {
                        out.push_str("; ");
                    }
                    if let Some(name) = &field.name {
                        out.push_str(name);
                        out.push(' ');
                    }
                    self.format_into(field.ty, out);
                }
                out.push('}');
            }
            TypeData::Named { name, .. } => out.push_str(name),
        }
    }

    fn format_list(&self, types: &[Idx], out: &mut String) {
        for (i, &ty) in types.iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            self.format_into(ty, out);
        }
    }
}
