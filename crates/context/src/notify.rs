//! Session-wide "active business unit" notifications.

use opsdash_core::BusinessUnitRef;

/// Receives the active business unit whenever it changes.
///
/// `None` means the active unit was cleared.
pub trait ActiveUnitSink {
    fn active_unit_changed(&mut self, unit: Option<&BusinessUnitRef>);
}

/// Sink that discards notifications.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSink;

impl ActiveUnitSink for NoopSink {
    fn active_unit_changed(&mut self, _unit: Option<&BusinessUnitRef>) {}
}

/// Sink that logs each change.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl ActiveUnitSink for TracingSink {
    fn active_unit_changed(&mut self, unit: Option<&BusinessUnitRef>) {
        match unit {
            Some(unit) => tracing::info!(business_unit = %unit, "active business unit changed"),
            None => tracing::info!("active business unit cleared"),
        }
    }
}

/// Sink that keeps every notification, in order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordingSink {
    pub events: Vec<Option<BusinessUnitRef>>,
}

impl ActiveUnitSink for RecordingSink {
    fn active_unit_changed(&mut self, unit: Option<&BusinessUnitRef>) {
        self.events.push(unit.cloned());
    }
}

/// Forwards to a sink only when the value differs from the last one reported.
///
/// The session starts with no active unit, so an initial `None` is not reported.
#[derive(Debug, Clone, Default)]
pub struct ActiveUnitNotifier<N> {
    sink: N,
    last: Option<BusinessUnitRef>,
}

impl<N: ActiveUnitSink> ActiveUnitNotifier<N> {
    pub fn new(sink: N) -> Self {
        Self { sink, last: None }
    }

    /// Report `unit`; returns `true` if the sink was called.
    pub fn report(&mut self, unit: Option<&BusinessUnitRef>) -> bool {
        if self.last.as_ref() == unit {
            return false;
        }
        self.last = unit.cloned();
        self.sink.active_unit_changed(unit);
        true
    }

    pub fn last_reported(&self) -> Option<&BusinessUnitRef> {
        self.last.as_ref()
    }

    pub fn sink(&self) -> &N {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut N {
        &mut self.sink
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit(raw: &str) -> BusinessUnitRef {
        BusinessUnitRef::parse(raw).unwrap()
    }

    #[test]
    fn reports_only_on_change() {
        let mut notifier = ActiveUnitNotifier::new(RecordingSink::default());

        assert!(!notifier.report(None));
        assert!(notifier.report(Some(&unit("acme-shop"))));
        assert!(!notifier.report(Some(&unit("acme-shop"))));
        assert!(notifier.report(Some(&unit("north"))));
        assert!(notifier.report(None));
        assert!(!notifier.report(None));

        assert_eq!(
            notifier.sink().events,
            vec![Some(unit("acme-shop")), Some(unit("north")), None]
        );
    }
}
