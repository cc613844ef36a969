use std::marker::PhantomData;

use prost::Message;
use recserde_api::SerdeError;

// ═══════════════════════════════════════════════════════════════
//  ProtobufCodec
// ═══════════════════════════════════════════════════════════════

/// Binary protobuf codec for one compiled message type.
///
/// Decoding skips fields the message does not declare. Encoding is
/// deterministic: fields are written in tag order.
pub struct ProtobufCodec<M> {
    _message: PhantomData<fn() -> M>,
}

impl<M: Message + Default> ProtobufCodec<M> {
    pub fn new() -> Self {
        Self {
            _message: PhantomData,
        }
    }

    /// Fails with `MalformedPayload` on invalid varints or tags, truncated
    /// fields and wire-type mismatches.
    pub fn decode(&self, bytes: &[u8]) -> Result<M, SerdeError> {
        M::decode(bytes).map_err(|e| SerdeError::malformed(format!("protobuf decode: {e}")))
    }

    pub fn encode(&self, message: &M) -> Vec<u8> {
        message.encode_to_vec()
    }
}

impl<M: Message + Default> Default for ProtobufCodec<M> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use card_domain::CreditCard;
    use recserde_api::ErrorKind;

    fn john_snow() -> CreditCard {
        CreditCard {
            name: "John Snow".into(),
            card_number: "1111".into(),
            r#type: "VISA".into(),
            country: "UK".into(),
            currency: "GBP".into(),
            blocked: false,
        }
    }

    #[test]
    fn round_trip() {
        let codec = ProtobufCodec::<CreditCard>::new();
        let msg = john_snow();
        assert_eq!(codec.decode(&codec.encode(&msg)).unwrap(), msg);
    }

    #[test]
    fn encoding_is_deterministic_and_in_tag_order() {
        let codec = ProtobufCodec::<CreditCard>::new();
        let bytes = codec.encode(&john_snow());
        assert_eq!(bytes, codec.encode(&john_snow()));
        // field 1 (name), wire type 2 → key 0x0a, then length 9.
        assert_eq!(&bytes[..2], &[0x0a, 9]);
        assert_eq!(&bytes[2..11], b"John Snow");
    }

    #[test]
    fn all_zero_buffer_is_malformed() {
        let codec = ProtobufCodec::<CreditCard>::new();
        let err = codec.decode(&[0u8; 16]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedPayload);
    }

    #[test]
    fn truncated_buffer_is_malformed() {
        let codec = ProtobufCodec::<CreditCard>::new();
        let bytes = codec.encode(&john_snow());
        for cut in [1, 5, bytes.len() - 1] {
            let err = codec.decode(&bytes[..cut]).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::MalformedPayload, "cut at {cut}");
        }
    }

    #[test]
    fn invalid_varint_is_malformed() {
        let codec = ProtobufCodec::<CreditCard>::new();
        // Key for field 6 (varint), then eleven continuation bytes.
        let mut bytes = vec![0x30];
        bytes.extend([0xff; 11]);
        let err = codec.decode(&bytes).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedPayload);
    }

    #[test]
    fn wire_type_mismatch_is_malformed() {
        let codec = ProtobufCodec::<CreditCard>::new();
        // Field 1 (string) sent as varint.
        let err = codec.decode(&[0x08, 0x01]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedPayload);
    }

    #[test]
    fn unknown_fields_are_skipped() {
        let codec = ProtobufCodec::<CreditCard>::new();
        let mut bytes = codec.encode(&john_snow());
        // Field 15, varint 7, not declared by CreditCard.
        bytes.extend([0x78, 0x07]);
        // Field 16, length-delimited "xy".
        bytes.extend([0x82, 0x01, 0x02, b'x', b'y']);
        assert_eq!(codec.decode(&bytes).unwrap(), john_snow());
    }
}
