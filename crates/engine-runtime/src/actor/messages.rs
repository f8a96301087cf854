use engine_processing::envelope::InboundMessage;

/// Messages for the worker actor.
#[derive(Debug)]
pub enum WorkerMsg {
    /// A shard request taken off the inbound channel.
    Deliver(InboundMessage),
}
