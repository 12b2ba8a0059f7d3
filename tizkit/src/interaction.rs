use crate::error::Result;
use crate::model::ConnectionStyle;
use crate::Diagram;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum GestureState {
    #[default]
    Idle,
    AwaitingSource,
    AwaitingTarget { from: u32 },
}

/// Two-click connect mode: pick a source node, then a target node.
#[derive(Clone, Debug, Default)]
pub struct ConnectGesture {
    state: GestureState,
    pub style: ConnectionStyle,
}

impl ConnectGesture {
    pub fn new(style: ConnectionStyle) -> Self {
        ConnectGesture { state: GestureState::Idle, style }
    }

    pub fn state(&self) -> GestureState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state != GestureState::Idle
    }

    pub fn start(&mut self) {
        self.state = GestureState::AwaitingSource;
    }

    pub fn cancel(&mut self) {
        self.state = GestureState::Idle;
    }

    /// Feed a node click. Returns the new connection id once the second
    /// endpoint is picked. Clicks while idle, and a repeat click on the
    /// source, do nothing. If the source was deleted meanwhile, the click
    /// picks a new source.
    pub fn click(&mut self, diagram: &mut Diagram, node: u32) -> Result<Option<u32>> {
        if let GestureState::AwaitingTarget { from } = self.state {
            if diagram.node(from).is_none() {
                tracing::debug!(source = from, "connect source vanished");
                self.state = GestureState::AwaitingSource;
            }
        }
        match self.state {
            GestureState::Idle => Ok(None),
            GestureState::AwaitingSource => {
                if diagram.node(node).is_none() {
                    return Err(crate::DiagramError::node(node));
                }
                self.state = GestureState::AwaitingTarget { from: node };
                Ok(None)
            }
            GestureState::AwaitingTarget { from } if from == node => Ok(None),
            GestureState::AwaitingTarget { from } => {
                let id = diagram.connect(from, node, self.style.clone())?;
                self.state = GestureState::Idle;
                Ok(Some(id))
            }
        }
    }
}
