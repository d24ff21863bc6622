//! # Gluster Stats Gatherer
//!
//! Discovers the GlusterFS volume/brick topology of this node and runs the
//! matching collector hook for every locally hosted brick, aggregating hook
//! stdout into one ordered stream.
//!
//! The pipeline is linear: [`report::fetch`] captures the volume-info
//! report, [`topology::parse`] turns it into a [`topology::Topology`], and
//! [`dispatch::Dispatcher::run`] walks that model, validating daemons and
//! invoking one hook per local brick.

#[macro_use]
extern crate tracing;

pub mod dispatch;
pub mod report;
pub mod topology;
