//! Callback-function conversions.
//!
//! A callback is stored as a handle to the callable object. With `[LegacyTreatNonObjectAsNull]` (on the
//! callback declaration or the use site) a nullable callback accepts any object and maps every non-object to
//! `None` instead of throwing.

use super::{ConversionTarget, Converter};
use crate::backend::errors::{GenerationError, GenerationResult};
use crate::backend::source_generator::SourceGenerator;

impl Converter<'_> {
    pub(super) fn callback(&self, generator: &mut SourceGenerator, target: &ConversionTarget<'_>) -> GenerationResult<()> {
        let name = target.ty.name();
        let declaration = self
            .interface
            .callback_function(name)
            .ok_or_else(|| GenerationError::UnsupportedType {
                ty: name.to_string(),
                context: "callback conversion".to_string(),
            })?;
        self.usable_default(target)?;

        let legacy = declaration.is_legacy_treat_non_object_as_null || target.attributes.legacy_treat_non_object_as_null;
        if legacy && target.ty.is_nullable() {
            generator.appendln("    let @host@: Option<Handle<CallbackType>> = @js@.as_object().map(Handle::new);");
            return Ok(());
        }
        let expression = format!("to_callback(realm, &@js@, {:?})?", target.label);
        self.bind_expression(generator, target, "Handle<CallbackType>", None, &expression)
    }
}
