use crate::chip8::Chip8;
use crate::context::Context;
use crate::error::BuildError;

pub struct Builder<'a, C: Context> {
    context: Option<C>,
    program: Option<&'a [u8]>,
}

impl<'a, C: Context> Builder<'a, C> {
    pub fn new() -> Self {
        Self {
            context: None,
            program: None,
        }
    }

    pub fn with_context(mut self, ctx: C) -> Self {
        self.context = Some(ctx);
        self
    }

    pub fn with_program(mut self, prog: &'a [u8]) -> Self {
        self.program = Some(prog);
        self
    }

    pub fn build(self) -> Result<Chip8<C>, BuildError> {
        let context = self.context.ok_or(BuildError::MissingContext)?;
        let program = self.program.ok_or(BuildError::MissingProgram)?;
        Ok(Chip8::load(context, program)?)
    }
}

impl<'a, C: Context> Default for Builder<'a, C> {
    fn default() -> Self {
        Self::new()
    }
}
