use std::rc::Rc;

use indexmap::IndexMap;
use tracing::trace;

use wollok_core::ast::Linked;
use wollok_core::environment::Environment;
use wollok_core::NodeRef;

use crate::error::{Result, RuntimeError};
use crate::frame::{Frame, Interruption};
use crate::instance::{InnerValue, Instance, InstanceId};

/// The number of decimal places kept on number instances.
pub const DECIMAL_PRECISION: usize = 5;

/// The fully qualified name of the number module.
pub const NUMBER_MODULE: &str = "wollok.lang.Number";
/// The fully qualified name of the string module.
pub const STRING_MODULE: &str = "wollok.lang.String";

/// The complete state of one evaluation.
///
/// It holds the frame stack and the instance heap, and runs against
/// an immutable linked environment. Cloning an evaluation produces a
/// snapshot: frames and instances are copied deeply enough that
/// further mutations through either side stay isolated, while the
/// node tree stays shared.
#[derive(Clone)]
pub struct Evaluation {
    /// The linked environment this evaluation runs against.
    pub environment: Rc<Environment>,
    /// The stack of active frames; the last one is current.
    pub frame_stack: Vec<Frame>,
    /// The instance heap, keyed by instance id.
    pub instances: IndexMap<InstanceId, Instance>,
}

impl Evaluation {
    /// Construct an empty evaluation over the given environment.
    pub fn new(environment: Rc<Environment>) -> Self {
        Self {
            environment,
            frame_stack: Vec::new(),
            instances: IndexMap::new(),
        }
    }

    /// The currently executing frame.
    pub fn current_frame(&self) -> Result<&Frame> {
        self.frame_stack.last().ok_or(RuntimeError::StackUnderflow)
    }

    /// The currently executing frame, mutably.
    pub fn current_frame_mut(&mut self) -> Result<&mut Frame> {
        self.frame_stack
            .last_mut()
            .ok_or(RuntimeError::StackUnderflow)
    }

    /// Push a frame on top of the stack.
    pub fn push_frame(&mut self, frame: Frame) {
        self.frame_stack.push(frame);
    }

    /// Remove and return the top frame, if any.
    pub fn pop_frame(&mut self) -> Option<Frame> {
        self.frame_stack.pop()
    }

    /// Get the instance with the given id.
    pub fn instance(&self, id: &InstanceId) -> Result<&Instance> {
        self.instances
            .get(id)
            .ok_or_else(|| RuntimeError::UndefinedInstance { id: id.clone() })
    }

    /// Get the instance with the given id, mutably.
    pub fn instance_mut(&mut self, id: &InstanceId) -> Result<&mut Instance> {
        self.instances
            .get_mut(id)
            .ok_or_else(|| RuntimeError::UndefinedInstance { id: id.clone() })
    }

    /// The module node an instance is an instance of.
    pub fn module_of(&self, id: &InstanceId) -> Result<NodeRef<Linked>> {
        let instance = self.instance(id)?;
        Ok(self.environment.get_node_by_fqn(&instance.module)?)
    }

    /// Create an instance of the given module and return its id.
    ///
    /// Numbers and strings are interned: their id derives from their
    /// value, so structurally equal primitives share one entry.
    /// Number payloads are rounded to `DECIMAL_PRECISION` decimals
    /// first; negative zero collapses onto zero and every NaN renders
    /// as one spelling, so both intern to a single cell. Any other
    /// module gets a freshly minted id.
    pub fn create_instance(
        &mut self,
        module: impl Into<String>,
        base_inner_value: Option<InnerValue>,
    ) -> InstanceId {
        let module = module.into();
        let (id, inner_value) = match (module.as_str(), base_inner_value) {
            (NUMBER_MODULE, Some(InnerValue::Number(value))) => {
                let value = if value == 0.0 { 0.0 } else { value };
                let rendered = format!("{:.*}", DECIMAL_PRECISION, value);
                let rounded = rendered.parse::<f64>().unwrap_or(value);
                (
                    InstanceId::interned_number(&rendered),
                    Some(InnerValue::Number(rounded)),
                )
            }
            (STRING_MODULE, Some(InnerValue::String(value))) => (
                InstanceId::interned_string(&value),
                Some(InnerValue::String(value)),
            ),
            (_, base_inner_value) => (InstanceId::fresh(), base_inner_value),
        };
        trace!(%id, %module, "instance created");
        self.instances.insert(
            id.clone(),
            Instance {
                id: id.clone(),
                module,
                fields: IndexMap::new(),
                inner_value,
            },
        );
        id
    }

    /// Unwind the frame stack with the given interruption.
    ///
    /// Frames are popped until one remains that resumes this kind;
    /// that frame stops resuming it and receives the interruption
    /// value on its operand stack. Exhausting the stack makes the
    /// interruption unhandled, which is fatal.
    pub fn interrupt(&mut self, interruption: Interruption, value: InstanceId) -> Result<()> {
        while let Some(frame) = self.frame_stack.last_mut() {
            if frame.resume.shift_remove(&interruption) {
                frame.push_operand(value);
                return Ok(());
            }
            self.frame_stack.pop();
            trace!(%interruption, "frame popped during unwind");
        }
        let detail = match interruption {
            Interruption::Exception => self.exception_detail(&value)?,
            _ => String::new(),
        };
        Err(RuntimeError::UnhandledInterruption {
            interruption,
            detail,
        })
    }

    /// Describe an unhandled exception from its instance: the module
    /// name, then the `message` field's payload when present, or the
    /// instance's own payload.
    fn exception_detail(&self, id: &InstanceId) -> Result<String> {
        let instance = self.instance(id)?;
        let message = instance
            .fields
            .get("message")
            .and_then(|message_id| self.instances.get(message_id))
            .and_then(|message| message.inner_value.as_ref())
            .or(instance.inner_value.as_ref());
        Ok(match message {
            Some(value) => format!("{}: {}", instance.module, value),
            None => format!("{}: ", instance.module),
        })
    }
}
