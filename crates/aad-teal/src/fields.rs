//! # Transaction and Global Fields
//!
//! Field names as they appear after `txn`, `txna` and `global`.

use crate::types::TealType;

/// Scalar fields of the current transaction (`txn <field>`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TxnField {
    Sender,
    Fee,
    FirstValid,
    LastValid,
    Note,
    Lease,
    GroupIndex,
    TxId,
    ApplicationId,
    OnCompletion,
    NumAppArgs,
    NumAccounts,
    NumApplications,
    ApprovalProgram,
    ClearStateProgram,
    RekeyTo,
}

impl TxnField {
    /// Field name in program source.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Sender => "Sender",
            Self::Fee => "Fee",
            Self::FirstValid => "FirstValid",
            Self::LastValid => "LastValid",
            Self::Note => "Note",
            Self::Lease => "Lease",
            Self::GroupIndex => "GroupIndex",
            Self::TxId => "TxID",
            Self::ApplicationId => "ApplicationID",
            Self::OnCompletion => "OnCompletion",
            Self::NumAppArgs => "NumAppArgs",
            Self::NumAccounts => "NumAccounts",
            Self::NumApplications => "NumApplications",
            Self::ApprovalProgram => "ApprovalProgram",
            Self::ClearStateProgram => "ClearStateProgram",
            Self::RekeyTo => "RekeyTo",
        }
    }

    /// Type of the value pushed.
    #[must_use]
    pub const fn value_type(self) -> TealType {
        match self {
            Self::Sender
            | Self::Note
            | Self::Lease
            | Self::TxId
            | Self::ApprovalProgram
            | Self::ClearStateProgram
            | Self::RekeyTo => TealType::Bytes,
            _ => TealType::Uint64,
        }
    }
}

/// Array fields of the current transaction (`txna <field> <index>`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TxnArrayField {
    ApplicationArgs,
    Accounts,
    Applications,
}

impl TxnArrayField {
    /// Field name in program source.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::ApplicationArgs => "ApplicationArgs",
            Self::Accounts => "Accounts",
            Self::Applications => "Applications",
        }
    }

    /// Type of each element.
    #[must_use]
    pub const fn value_type(self) -> TealType {
        match self {
            Self::ApplicationArgs | Self::Accounts => TealType::Bytes,
            Self::Applications => TealType::Uint64,
        }
    }

    /// The scalar field holding this array's length.
    #[must_use]
    pub const fn length_field(self) -> TxnField {
        match self {
            Self::ApplicationArgs => TxnField::NumAppArgs,
            Self::Accounts => TxnField::NumAccounts,
            Self::Applications => TxnField::NumApplications,
        }
    }
}

/// Global fields (`global <field>`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GlobalField {
    MinTxnFee,
    MinBalance,
    MaxTxnLife,
    ZeroAddress,
    GroupSize,
    LogicSigVersion,
    Round,
    LatestTimestamp,
    CurrentApplicationId,
    CreatorAddress,
    CurrentApplicationAddress,
    GroupId,
}

impl GlobalField {
    /// Field name in program source.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::MinTxnFee => "MinTxnFee",
            Self::MinBalance => "MinBalance",
            Self::MaxTxnLife => "MaxTxnLife",
            Self::ZeroAddress => "ZeroAddress",
            Self::GroupSize => "GroupSize",
            Self::LogicSigVersion => "LogicSigVersion",
            Self::Round => "Round",
            Self::LatestTimestamp => "LatestTimestamp",
            Self::CurrentApplicationId => "CurrentApplicationID",
            Self::CreatorAddress => "CreatorAddress",
            Self::CurrentApplicationAddress => "CurrentApplicationAddress",
            Self::GroupId => "GroupID",
        }
    }

    /// Type of the value pushed.
    #[must_use]
    pub const fn value_type(self) -> TealType {
        match self {
            Self::ZeroAddress
            | Self::CreatorAddress
            | Self::CurrentApplicationAddress
            | Self::GroupId => TealType::Bytes,
            _ => TealType::Uint64,
        }
    }

    /// Earliest program version exposing this field.
    #[must_use]
    pub const fn min_version(self) -> u8 {
        match self {
            Self::CurrentApplicationAddress | Self::GroupId => 5,
            Self::CreatorAddress => 3,
            Self::Round | Self::LatestTimestamp | Self::CurrentApplicationId => 2,
            _ => 1,
        }
    }
}
