//! `input` and `output`, defined in every module on top of the C library's
//! `scanf` and `printf`.

use inkwell::{module::Linkage, AddressSpace};

use super::{CodeGenerator, Symbol};
use crate::ast::LiteralType;
use crate::error::CodegenError;

impl<'ctx, 'd> CodeGenerator<'ctx, 'd> {
    pub(super) fn define_intrinsics(&mut self) -> Result<(), CodegenError> {
        let i32_type = self.i32_type();
        let format_type = self.context.i8_type().ptr_type(AddressSpace::default());
        let variadic = i32_type.fn_type(&[format_type.into()], true);
        let scanf = self.module.add_function("scanf", variadic, Some(Linkage::External));
        let printf = self.module.add_function("printf", variadic, Some(Linkage::External));

        // int input(void): read one integer from stdin
        let input_type = i32_type.fn_type(&[], false);
        let input = self.module.add_function("input", input_type, None);
        let entry = self.context.append_basic_block(input, "entry");
        self.builder.position_at_end(entry);
        let slot = self.builder.build_alloca(i32_type, "value")?;
        self.builder.build_store(slot, i32_type.const_zero())?;
        let format = self.builder.build_global_string_ptr("%d", "input_format")?;
        self.builder
            .build_call(scanf, &[format.as_pointer_value().into(), slot.into()], "read")?;
        let value = self.builder.build_load(i32_type, slot, "value")?;
        self.builder.build_return(Some(&value))?;

        // void output(int x): print it on its own line
        let output_type = self.context.void_type().fn_type(&[i32_type.into()], false);
        let output = self.module.add_function("output", output_type, None);
        let entry = self.context.append_basic_block(output, "entry");
        self.builder.position_at_end(entry);
        let format = self.builder.build_global_string_ptr("%d\n", "output_format")?;
        if let Some(x) = output.get_first_param() {
            self.builder
                .build_call(printf, &[format.as_pointer_value().into(), x.into()], "")?;
        }
        self.builder.build_return(None)?;
        self.builder.clear_insertion_position();

        let bound = self
            .scope
            .add(
                "input",
                Symbol::Function {
                    function: input,
                    params: Vec::new(),
                    returns: LiteralType::Int,
                },
            )
            .and_then(|()| {
                self.scope.add(
                    "output",
                    Symbol::Function {
                        function: output,
                        params: vec![LiteralType::Int],
                        returns: LiteralType::Void,
                    },
                )
            });
        debug_assert!(bound.is_ok(), "intrinsics go into an empty global scope");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::with_module;
    use crate::diagnostics::DiagnosticKind;

    #[test]
    fn intrinsic_names_are_reserved() {
        let (_, diagnostics) = with_module(&["void output(int x) { }", "void main(void) { }"], |_| ());
        let errors: Vec<_> = diagnostics.of_kind(DiagnosticKind::SemanticError).collect();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains("redefinition of function `output`"));
    }

    #[test]
    fn intrinsics_verify_on_their_own() {
        let ((_, verified), diagnostics) = with_module(&["void main(void) { }"], |g| ((), g.verify()));
        assert!(diagnostics.is_empty());
        verified.unwrap();
    }
}
