use crate::{Action, DslError, Value};

/// The built-in action of the base grammar: `RETURN(…)` hands its arguments back to the
/// host unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReturnAction;

impl Action for ReturnAction {
    fn name(&self) -> &'static str {
        "RETURN"
    }

    fn validate_args(&self, _args: &[Value]) -> bool {
        true
    }

    fn execute(&self, mut args: Vec<Value>) -> Result<Value, DslError> {
        if args.len() == 1 {
            Ok(args.remove(0))
        } else {
            Ok(Value::List(args))
        }
    }
}
