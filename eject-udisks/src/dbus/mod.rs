// SPDX-License-Identifier: GPL-3.0-only

//! Decoding helpers for raw UDisks2 property values

pub(crate) mod bytestring;
pub(crate) mod property;
