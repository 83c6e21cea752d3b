//! 署名済みトランザクションのシリアライズサイズ推定。
//!
//! レガシー形式 (segwit の marker/flag なし) でのバイト数を数える。
//! P2WPKH の witness は割引なしで数えるため、segwit 入力を含む場合は
//! 実際の vsize の上限値となる。

use bitcoin::consensus::encode::VarInt;

/// P2PKH の scriptPubKey: OP_DUP OP_HASH160 <20> OP_EQUALVERIFY OP_CHECKSIG
#[cfg(test)]
pub const P2PKH_PK_SCRIPT_SIZE: usize = 1 + 1 + 1 + 20 + 1 + 1;

/// P2WPKH の scriptPubKey: OP_0 <20>
#[cfg(test)]
pub const P2WPKH_PK_SCRIPT_SIZE: usize = 1 + 1 + 20;

/// P2PKH の scriptSig: <最大長の署名 + sighash> <圧縮公開鍵>
pub const REDEEM_P2PKH_SIG_SCRIPT_SIZE: usize = 1 + 73 + 1 + 33;

/// P2WPKH の witness スタック: 要素数, <署名 + sighash>, <圧縮公開鍵>
pub const REDEEM_P2WPKH_WITNESS_SIZE: usize = 1 + (1 + 73) + (1 + 33);

// version (4) + lock_time (4)
const TX_OVERHEAD_SIZE: usize = 4 + 4;

fn compact_size(n: usize) -> usize {
    VarInt(n as u64).size()
}

pub fn estimate_input_size(redeem_script_size: usize) -> usize {
    32 + // 前のtxid
        4 + // 前の出力インデックス
        compact_size(redeem_script_size) +
        redeem_script_size +
        4 // sequence
}

pub fn estimate_output_size(pk_script_size: usize) -> usize {
    8 + // 金額
        compact_size(pk_script_size) +
        pk_script_size
}

/// 入力の redeem script サイズ列と出力の script サイズ列から、署名後の
/// トランザクションのシリアライズサイズを推定する。
pub fn estimate_serialize_size(redeem_script_sizes: &[usize], output_script_sizes: &[usize]) -> usize {
    let inputs_size: usize = redeem_script_sizes.iter().map(|&s| estimate_input_size(s)).sum();
    let outputs_size: usize = output_script_sizes.iter().map(|&s| estimate_output_size(s)).sum();

    TX_OVERHEAD_SIZE
        + compact_size(redeem_script_sizes.len())
        + compact_size(output_script_sizes.len())
        + inputs_size
        + outputs_size
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn well_known_component_sizes() {
        assert_eq!(estimate_input_size(REDEEM_P2PKH_SIG_SCRIPT_SIZE), 149);
        assert_eq!(estimate_input_size(REDEEM_P2WPKH_WITNESS_SIZE), 150);
        assert_eq!(estimate_output_size(P2PKH_PK_SCRIPT_SIZE), 34);
        assert_eq!(estimate_output_size(P2WPKH_PK_SCRIPT_SIZE), 31);
    }

    #[test]
    fn one_p2wpkh_input_two_p2pkh_outputs() {
        let size = estimate_serialize_size(
            &[REDEEM_P2WPKH_WITNESS_SIZE],
            &[P2PKH_PK_SCRIPT_SIZE, P2PKH_PK_SCRIPT_SIZE],
        );
        assert_eq!(size, 10 + 150 + 34 + 34);
    }

    #[test]
    fn empty_transaction_is_overhead_only() {
        assert_eq!(estimate_serialize_size(&[], &[]), 10);
    }

    #[test]
    fn long_scripts_use_wider_length_prefix() {
        assert_eq!(estimate_output_size(252), 8 + 1 + 252);
        assert_eq!(estimate_output_size(253), 8 + 3 + 253);
    }

    #[test]
    fn count_prefix_grows_past_252_inputs() {
        let small = vec![REDEEM_P2PKH_SIG_SCRIPT_SIZE; 252];
        let large = vec![REDEEM_P2PKH_SIG_SCRIPT_SIZE; 253];
        let one_output = [P2PKH_PK_SCRIPT_SIZE];
        assert_eq!(
            estimate_serialize_size(&large, &one_output) - estimate_serialize_size(&small, &one_output),
            149 + 2
        );
    }

    #[test]
    fn monotonic_in_input_and_output_count() {
        let mut inputs = Vec::new();
        let mut last = estimate_serialize_size(&inputs, &[P2PKH_PK_SCRIPT_SIZE]);
        for _ in 0..300 {
            inputs.push(REDEEM_P2PKH_SIG_SCRIPT_SIZE);
            let next = estimate_serialize_size(&inputs, &[P2PKH_PK_SCRIPT_SIZE]);
            assert!(next >= last);
            last = next;
        }

        let mut outputs = Vec::new();
        let mut last = estimate_serialize_size(&[REDEEM_P2PKH_SIG_SCRIPT_SIZE], &outputs);
        for _ in 0..300 {
            outputs.push(P2WPKH_PK_SCRIPT_SIZE);
            let next = estimate_serialize_size(&[REDEEM_P2PKH_SIG_SCRIPT_SIZE], &outputs);
            assert!(next >= last);
            last = next;
        }
    }
}
