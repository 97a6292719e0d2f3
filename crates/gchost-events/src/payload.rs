//! Best-effort serialization of event payloads.
//!
//! A payload is flattened into a native-endian concatenation of its fields,
//! sized exactly. Recording is best effort end to end: a payload that cannot
//! be allocated is dropped, never surfaced as an error to the raiser.

/// A value that can be flattened into an event payload.
pub trait EventPayload {
    /// Exact number of bytes `serialize_to` will append.
    fn serialized_size(&self) -> usize;

    /// Append the native-endian encoding of `self` to `buf`.
    fn serialize_to(&self, buf: &mut Vec<u8>);
}

macro_rules! integer_payload {
    ($($ty:ty),* $(,)?) => {$(
        impl EventPayload for $ty {
            fn serialized_size(&self) -> usize {
                std::mem::size_of::<$ty>()
            }

            fn serialize_to(&self, buf: &mut Vec<u8>) {
                buf.extend_from_slice(&self.to_ne_bytes());
            }
        }
    )*};
}

integer_payload!(u8, u16, u32, u64, usize);

impl EventPayload for () {
    fn serialized_size(&self) -> usize {
        0
    }

    fn serialize_to(&self, _buf: &mut Vec<u8>) {}
}

macro_rules! tuple_payload {
    ($($name:ident),+) => {
        impl<$($name: EventPayload),+> EventPayload for ($($name,)+) {
            fn serialized_size(&self) -> usize {
                #[allow(non_snake_case)]
                let ($($name,)+) = self;
                0 $(+ $name.serialized_size())+
            }

            fn serialize_to(&self, buf: &mut Vec<u8>) {
                #[allow(non_snake_case)]
                let ($($name,)+) = self;
                $($name.serialize_to(buf);)+
            }
        }
    };
}

tuple_payload!(A);
tuple_payload!(A, B);
tuple_payload!(A, B, C);
tuple_payload!(A, B, C, D);
tuple_payload!(A, B, C, D, E);
tuple_payload!(A, B, C, D, E, F);

/// Serialize a payload into a freshly allocated buffer.
///
/// Returns `None` when the buffer cannot be allocated.
pub fn serialize_event<P: EventPayload>(payload: &P) -> Option<Vec<u8>> {
    let mut buf = Vec::new();
    buf.try_reserve_exact(payload.serialized_size()).ok()?;
    payload.serialize_to(&mut buf);
    Some(buf)
}
