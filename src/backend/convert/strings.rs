//! String conversions (`DOMString`, `ByteString`, `USVString`, `CSSOMString`).

use webidl_core::lang::strings;

use super::{ConversionTarget, Converter};
use crate::backend::errors::{GenerationError, GenerationResult};
use crate::backend::source_generator::SourceGenerator;

impl Converter<'_> {
    pub(super) fn string(&self, generator: &mut SourceGenerator, target: &ConversionTarget<'_>) -> GenerationResult<()> {
        let info = strings::from_str(target.ty.name())
            .map(strings::info_for)
            .ok_or_else(|| GenerationError::UnsupportedType {
                ty: target.ty.to_string(),
                context: "string conversion".to_string(),
            })?;
        let default = self.scalar_default(target, "String")?;

        let mut expression = format!("{}(realm, &@js@)?", info.conversion);
        if target.attributes.legacy_null_to_empty_string && !target.ty.is_nullable() {
            expression = format!("if @js@.is_null() {{ String::new() }} else {{ {expression} }}");
        }
        self.bind_expression(generator, target, "String", default, &expression)
    }
}
