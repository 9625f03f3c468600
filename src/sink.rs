// Field sink: where completed fields go
//
// The parser owns the bytes; a sink only borrows each field for the length
// of the call and must copy out anything it wants to keep. The parser is
// mutably borrowed while the sink runs, so a sink cannot call back into it.

/// Receives the fields of a completed record, one call per field, with
/// 0-based indices in increasing order.
pub trait FieldSink {
    fn on_field(&mut self, index: usize, field: &[u8]);
}

impl<F> FieldSink for F
where
    F: FnMut(usize, &[u8]),
{
    #[inline]
    fn on_field(&mut self, index: usize, field: &[u8]) {
        self(index, field)
    }
}

/// Collects fields in order, copying each one out: one inner vector per
/// field.
impl FieldSink for Vec<Vec<u8>> {
    fn on_field(&mut self, _index: usize, field: &[u8]) {
        self.push(field.to_vec());
    }
}

/// Sink that drops every field. Useful to skip records.
#[derive(Debug, Default, Clone, Copy)]
pub struct Discard;

impl FieldSink for Discard {
    #[inline]
    fn on_field(&mut self, _index: usize, _field: &[u8]) {}
}
