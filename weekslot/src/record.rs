//! The week slot record stored in the program-owned account.

/// State of a week slot account.
///
/// Each slot corresponds to one day of the week and holds a bitmap of hours.
/// The record is serialised as seven little-endian 32-bit integers in field
/// order with no padding, which is the same layout Borsh uses for the
/// structure on the program side.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct WeekSlot {
    pub slot1: u32,
    pub slot2: u32,
    pub slot3: u32,
    pub slot4: u32,
    pub slot5: u32,
    pub slot6: u32,
    pub slot7: u32,
}

/// Error returned when decoding a record from a buffer which is too short.
#[derive(Clone, Copy, Debug, PartialEq, Eq, derive_more::Display)]
#[display("malformed week slot record: got {len} bytes, need {}", WeekSlot::SIZE)]
pub struct MalformedRecord {
    /// Length of the rejected buffer.
    pub len: usize,
}

impl WeekSlot {
    /// Size of the serialised record.
    pub const SIZE: usize = 28;

    /// Returns slots in day order.
    pub fn slots(&self) -> [u32; 7] {
        [
            self.slot1, self.slot2, self.slot3, self.slot4, self.slot5,
            self.slot6, self.slot7,
        ]
    }

    /// Returns whether given hour of given day is set.
    ///
    /// `day` counts from zero.  Out of range days and hours are never set.
    pub fn is_set(&self, day: u8, hour: u8) -> bool {
        let slot = self.slots().get(usize::from(day)).copied().unwrap_or(0);
        1u32.checked_shl(u32::from(hour)).is_some_and(|bit| slot & bit != 0)
    }

    /// Serialises the record.
    pub fn encode(&self) -> [u8; Self::SIZE] {
        let mut buf = [0; Self::SIZE];
        for (chunk, slot) in buf.chunks_exact_mut(4).zip(self.slots()) {
            chunk.copy_from_slice(&slot.to_le_bytes());
        }
        buf
    }

    /// Deserialises the record from the start of `bytes`.
    ///
    /// Account data may be larger than the record; any bytes past
    /// [`Self::SIZE`] are ignored.
    pub fn decode(bytes: &[u8]) -> Result<Self, MalformedRecord> {
        let bytes = bytes
            .get(..Self::SIZE)
            .ok_or(MalformedRecord { len: bytes.len() })?;
        let mut slots = [0; 7];
        for (slot, chunk) in slots.iter_mut().zip(bytes.chunks_exact(4)) {
            *slot = u32::from_le_bytes(chunk.try_into().unwrap());
        }
        Ok(Self::from(slots))
    }
}

impl From<[u32; 7]> for WeekSlot {
    fn from(slots: [u32; 7]) -> Self {
        let [slot1, slot2, slot3, slot4, slot5, slot6, slot7] = slots;
        Self { slot1, slot2, slot3, slot4, slot5, slot6, slot7 }
    }
}


#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    const SAMPLE: WeekSlot = WeekSlot {
        slot1: 1,
        slot2: 2,
        slot3: 3,
        slot4: 4,
        slot5: 5,
        slot6: 6,
        slot7: 7,
    };

    #[test]
    fn test_encode() {
        let want = [
            1, 0, 0, 0, 2, 0, 0, 0, 3, 0, 0, 0, 4, 0, 0, 0, 5, 0, 0, 0, 6, 0,
            0, 0, 7, 0, 0, 0,
        ];
        assert_eq!(want, SAMPLE.encode());

        let record = WeekSlot::from([0x0403_0201, 0, 0, 0, 0, 0, u32::MAX]);
        let bytes = record.encode();
        assert_eq!(&[1, 2, 3, 4][..], &bytes[..4]);
        assert_eq!(&[0xff; 4][..], &bytes[24..]);
    }

    #[test]
    fn test_decode() {
        let bytes = SAMPLE.encode();
        assert_eq!(Ok(SAMPLE), WeekSlot::decode(&bytes));

        let mut long = bytes.to_vec();
        long.extend_from_slice(b"garbage");
        assert_eq!(Ok(SAMPLE), WeekSlot::decode(&long));

        let record = WeekSlot::from([u32::MAX, 0, 1 << 31, 0x1234_5678, 0, 1, 2]);
        assert_eq!(Ok(record), WeekSlot::decode(&record.encode()));
    }

    #[test]
    fn test_decode_short() {
        let bytes = SAMPLE.encode();
        assert_eq!(Err(MalformedRecord { len: 0 }), WeekSlot::decode(&[]));
        assert_eq!(
            Err(MalformedRecord { len: 27 }),
            WeekSlot::decode(&bytes[..27])
        );
    }

    #[test]
    fn test_is_set() {
        let record = WeekSlot::from([1 << 11, 0, 0, 0, 0, 0, (1 << 31) | 1]);
        assert!(record.is_set(0, 11));
        assert!(!record.is_set(0, 10));
        assert!(!record.is_set(1, 11));
        assert!(record.is_set(6, 0));
        assert!(record.is_set(6, 31));
        assert!(!record.is_set(6, 32));
        assert!(!record.is_set(7, 0));
    }
}
