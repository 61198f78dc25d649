// SPDX-License-Identifier: GPL-3.0-only

//! UDisks2 byte strings (`ay`) are NUL-terminated paths.

/// Decode a NUL-terminated byte string, ignoring anything after the first NUL.
pub(crate) fn decode_c_string_bytes(bytes: &[u8]) -> String {
    let raw = bytes.split(|b| *b == 0).next().unwrap_or(bytes);
    String::from_utf8_lossy(raw).to_string()
}

/// Decode an `aay` mount point list, dropping empty entries.
pub(crate) fn decode_mount_points(mount_points: Vec<Vec<u8>>) -> Vec<String> {
    mount_points
        .into_iter()
        .map(|mp| decode_c_string_bytes(&mp))
        .filter(|mp| !mp.is_empty())
        .collect()
}
