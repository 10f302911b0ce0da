//! The encoded transaction block and the envelope it is signed in.
//!
//! A [`ProgrammableTransaction`] is a framed sequence of [`CallArg`] inputs
//! followed by a framed sequence of [`Command`]s. [`TransactionData`] adds
//! the sender, gas payment and expiration; its [`signing_bytes`]
//! (`intent ++ bcs(data)`) are what a wallet signs.
//!
//! [`signing_bytes`]: TransactionData::signing_bytes

use sui_bcs::{
    deserialize_sequence, from_bytes, serialize_sequence, to_bytes, DecodeError, DecodeResult,
    Deserializable, Deserializer, Serializable, Serializer,
};
use sui_ptb_types::encoding::{base64_decode, base64_encode};
use sui_ptb_types::{CallArg, SuiAddress, SuiObjectRef};

use crate::command::Command;

/// Intent scope `TransactionData`, version 0, app id Sui.
pub const INTENT_PREFIX: [u8; 3] = [0, 0, 0];

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ProgrammableTransaction {
    pub inputs: Vec<CallArg>,
    pub commands: Vec<Command>,
}

impl ProgrammableTransaction {
    pub fn to_bytes(&self) -> Vec<u8> {
        to_bytes(self)
    }

    pub fn from_bytes(bytes: &[u8]) -> DecodeResult<Self> {
        from_bytes(bytes)
    }

    pub fn to_base64(&self) -> String {
        base64_encode(&self.to_bytes())
    }

    pub fn from_base64(b64: &str) -> anyhow::Result<Self> {
        let bytes = base64_decode(b64, "programmable transaction")?;
        Ok(Self::from_bytes(&bytes)?)
    }
}

impl Serializable for ProgrammableTransaction {
    fn serialize(&self, ser: &mut Serializer) {
        serialize_sequence(&self.inputs, ser);
        serialize_sequence(&self.commands, ser);
    }
}

impl Deserializable for ProgrammableTransaction {
    fn deserialize(de: &mut Deserializer<'_>) -> DecodeResult<Self> {
        Ok(Self {
            inputs: deserialize_sequence(de)?,
            commands: deserialize_sequence(de)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum TransactionKind {
    ProgrammableTransaction(ProgrammableTransaction),
}

impl Serializable for TransactionKind {
    fn serialize(&self, ser: &mut Serializer) {
        match self {
            TransactionKind::ProgrammableTransaction(pt) => {
                ser.write_variant(0);
                pt.serialize(ser);
            }
        }
    }
}

impl Deserializable for TransactionKind {
    fn deserialize(de: &mut Deserializer<'_>) -> DecodeResult<Self> {
        let (tag, offset) = de.read_variant()?;
        match tag {
            0 => Ok(TransactionKind::ProgrammableTransaction(
                ProgrammableTransaction::deserialize(de)?,
            )),
            _ => Err(DecodeError::UnknownVariant {
                type_name: "TransactionKind",
                tag,
                offset,
            }),
        }
    }
}

/// Coins paying for execution and the price/budget they cover.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct GasData {
    pub payment: Vec<SuiObjectRef>,
    pub owner: SuiAddress,
    pub price: u64,
    pub budget: u64,
}

impl Serializable for GasData {
    fn serialize(&self, ser: &mut Serializer) {
        serialize_sequence(&self.payment, ser);
        self.owner.serialize(ser);
        ser.write_u64(self.price);
        ser.write_u64(self.budget);
    }
}

impl Deserializable for GasData {
    fn deserialize(de: &mut Deserializer<'_>) -> DecodeResult<Self> {
        Ok(Self {
            payment: deserialize_sequence(de)?,
            owner: SuiAddress::deserialize(de)?,
            price: de.read_u64()?,
            budget: de.read_u64()?,
        })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum TransactionExpiration {
    #[default]
    None,
    /// Invalid once this epoch has ended.
    Epoch(u64),
}

impl Serializable for TransactionExpiration {
    fn serialize(&self, ser: &mut Serializer) {
        match self {
            TransactionExpiration::None => ser.write_variant(0),
            TransactionExpiration::Epoch(epoch) => {
                ser.write_variant(1);
                ser.write_u64(*epoch);
            }
        }
    }
}

impl Deserializable for TransactionExpiration {
    fn deserialize(de: &mut Deserializer<'_>) -> DecodeResult<Self> {
        let (tag, offset) = de.read_variant()?;
        match tag {
            0 => Ok(TransactionExpiration::None),
            1 => Ok(TransactionExpiration::Epoch(de.read_u64()?)),
            _ => Err(DecodeError::UnknownVariant {
                type_name: "TransactionExpiration",
                tag,
                offset,
            }),
        }
    }
}

/// Versioned transaction envelope.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum TransactionData {
    V1 {
        kind: TransactionKind,
        sender: SuiAddress,
        gas_data: GasData,
        expiration: TransactionExpiration,
    },
}

impl TransactionData {
    pub fn new_programmable(
        sender: SuiAddress,
        pt: ProgrammableTransaction,
        gas_data: GasData,
    ) -> Self {
        TransactionData::V1 {
            kind: TransactionKind::ProgrammableTransaction(pt),
            sender,
            gas_data,
            expiration: TransactionExpiration::None,
        }
    }

    pub fn sender(&self) -> SuiAddress {
        match self {
            TransactionData::V1 { sender, .. } => *sender,
        }
    }

    pub fn programmable(&self) -> &ProgrammableTransaction {
        match self {
            TransactionData::V1 {
                kind: TransactionKind::ProgrammableTransaction(pt),
                ..
            } => pt,
        }
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        to_bytes(self)
    }

    pub fn from_bytes(bytes: &[u8]) -> DecodeResult<Self> {
        from_bytes(bytes)
    }

    /// `intent ++ bcs(self)`, the message a signature covers.
    pub fn signing_bytes(&self) -> Vec<u8> {
        let mut ser = Serializer::new();
        ser.write_fixed_bytes(&INTENT_PREFIX);
        self.serialize(&mut ser);
        ser.into_bytes()
    }

    pub fn to_base64(&self) -> String {
        base64_encode(&self.to_bytes())
    }
}

impl Serializable for TransactionData {
    fn serialize(&self, ser: &mut Serializer) {
        match self {
            TransactionData::V1 {
                kind,
                sender,
                gas_data,
                expiration,
            } => {
                ser.write_variant(0);
                kind.serialize(ser);
                sender.serialize(ser);
                gas_data.serialize(ser);
                expiration.serialize(ser);
            }
        }
    }
}

impl Deserializable for TransactionData {
    fn deserialize(de: &mut Deserializer<'_>) -> DecodeResult<Self> {
        let (tag, offset) = de.read_variant()?;
        match tag {
            0 => Ok(TransactionData::V1 {
                kind: TransactionKind::deserialize(de)?,
                sender: SuiAddress::deserialize(de)?,
                gas_data: GasData::deserialize(de)?,
                expiration: TransactionExpiration::deserialize(de)?,
            }),
            _ => Err(DecodeError::UnknownVariant {
                type_name: "TransactionData",
                tag,
                offset,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::argument::Argument;
    use sui_ptb_types::ObjectDigest;

    fn transfer_block() -> ProgrammableTransaction {
        ProgrammableTransaction {
            inputs: vec![
                CallArg::Pure(SuiAddress::from_u16(0xa11c).as_bytes().to_vec()),
                CallArg::Pure(100u64.to_le_bytes().to_vec()),
            ],
            commands: vec![
                Command::SplitCoins {
                    coin: Argument::GasCoin,
                    amounts: vec![Argument::Input(1)],
                },
                Command::TransferObjects {
                    objects: vec![Argument::Result(0)],
                    address: Argument::Input(0),
                },
            ],
        }
    }

    #[test]
    fn test_programmable_transaction_layout() {
        let bytes = transfer_block().to_bytes();
        // 2 inputs, first framed as 34 bytes: Pure tag, length 32, address.
        assert_eq!(&bytes[..3], &[2, 34, 0]);
        assert_eq!(bytes[3], 32);
        let decoded = ProgrammableTransaction::from_bytes(&bytes).unwrap();
        assert_eq!(decoded, transfer_block());
    }

    #[test]
    fn test_base64_roundtrip() {
        let pt = transfer_block();
        let b64 = pt.to_base64();
        assert_eq!(ProgrammableTransaction::from_base64(&b64).unwrap(), pt);
        assert!(ProgrammableTransaction::from_base64("not base64!").is_err());
    }

    #[test]
    fn test_signing_bytes_prefix() {
        let data = TransactionData::new_programmable(
            SuiAddress::from_u16(1),
            transfer_block(),
            GasData {
                payment: vec![SuiObjectRef {
                    object_id: SuiAddress::from_u16(0x99),
                    version: 3,
                    digest: ObjectDigest::new([7; 32]),
                }],
                owner: SuiAddress::from_u16(1),
                price: 1000,
                budget: 5_000_000,
            },
        );
        let signing = data.signing_bytes();
        assert_eq!(&signing[..3], &INTENT_PREFIX);
        assert_eq!(&signing[3..], data.to_bytes().as_slice());
        // V1 tag, then ProgrammableTransaction kind tag.
        assert_eq!(&signing[3..5], &[0, 0]);
        assert_eq!(TransactionData::from_bytes(&data.to_bytes()).unwrap(), data);
        assert_eq!(data.sender(), SuiAddress::from_u16(1));
    }

    #[test]
    fn test_unknown_envelope_tags() {
        assert_eq!(
            TransactionData::from_bytes(&[1]),
            Err(DecodeError::UnknownVariant {
                type_name: "TransactionData",
                tag: 1,
                offset: 0
            })
        );
        assert!(matches!(
            from_bytes::<TransactionExpiration>(&[2]),
            Err(DecodeError::UnknownVariant { tag: 2, .. })
        ));
    }
}
