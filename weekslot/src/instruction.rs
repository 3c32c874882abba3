use solana_sdk::instruction::{AccountMeta, Instruction};
use solana_sdk::pubkey::Pubkey;

/// Request to set or clear a single hour in the week slot account.
///
/// The program interprets `day` as a zero-based index into the seven slots
/// and `hour` as a bit position within the slot.  Values are passed through
/// as given; the program ignores days past the end of the week.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UpdateCommand {
    pub day: u8,
    pub hour: u8,
    pub state: bool,
}

impl UpdateCommand {
    /// Length of the instruction data.
    pub const SIZE: usize = 3;

    /// Encodes the command as `[day, hour, state]` instruction data.
    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        [self.day, self.hour, u8::from(self.state)]
    }

    /// Generates instruction calling `program_id` to update the `weekslot`
    /// account.
    ///
    /// The account must be owned by the program; it is passed as writable and
    /// doesn’t need to sign the transaction.
    pub fn instruction(&self, program_id: Pubkey, weekslot: Pubkey) -> Instruction {
        Instruction {
            program_id,
            accounts: vec![AccountMeta::new(weekslot, false)],
            data: self.to_bytes().to_vec(),
        }
    }
}


#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_to_bytes() {
        let check = |want: [u8; 3], day, hour, state| {
            assert_eq!(want, UpdateCommand { day, hour, state }.to_bytes());
        };
        check([5, 9, 0], 5, 9, false);
        check([0, 11, 1], 0, 11, true);
        check([255, 255, 1], 255, 255, true);
    }

    #[test]
    fn test_instruction() {
        let program_id = Pubkey::new_unique();
        let weekslot = Pubkey::new_unique();
        let cmd = UpdateCommand { day: 3, hour: 17, state: true };
        let got = cmd.instruction(program_id, weekslot);
        assert_eq!(program_id, got.program_id);
        assert_eq!(vec![AccountMeta::new(weekslot, false)], got.accounts);
        assert_eq!(vec![3, 17, 1], got.data);
    }
}
