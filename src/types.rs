use bitcoin::{OutPoint, TxOut, Sequence, script::ScriptBuf, Amount};
use crate::error::AppError;
use crate::txsizes::{REDEEM_P2PKH_SIG_SCRIPT_SIZE, REDEEM_P2WPKH_WITNESS_SIZE};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ScriptType {
    P2PKH,
    P2WPKH,
}

impl ScriptType {
    pub fn from_script_buf(script: &ScriptBuf) -> Result<Self, AppError> {
        if script.is_p2pkh() {
            Ok(ScriptType::P2PKH)
        } else if script.is_p2wpkh() {
            Ok(ScriptType::P2WPKH)
        } else {
            Err(AppError::UnknownScriptType { script_hex: script.to_hex_string() })
        }
    }

    /// 署名後にこの出力を使う入力が持つ redeem データの推定サイズ
    pub fn redeem_script_size(self) -> usize {
        match self {
            ScriptType::P2PKH => REDEEM_P2PKH_SIG_SCRIPT_SIZE,
            ScriptType::P2WPKH => REDEEM_P2WPKH_WITNESS_SIZE,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SpendableUtxo {
    pub out_point: OutPoint,
    pub tx_out: TxOut,
    pub script_type: ScriptType,
    pub sequence: Sequence,
}

impl SpendableUtxo {
    pub fn new(out_point: OutPoint, tx_out: TxOut, sequence: Sequence) -> Result<Self, AppError> {
        let script_type = ScriptType::from_script_buf(&tx_out.script_pubkey)?;
        Ok(SpendableUtxo { out_point, tx_out, script_type, sequence })
    }

    pub fn value(&self) -> Amount {
        self.tx_out.value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bitcoin::hashes::Hash;
    use bitcoin::{PubkeyHash, ScriptHash, WPubkeyHash};

    #[test]
    fn recognizes_supported_scripts() {
        let p2pkh = ScriptBuf::new_p2pkh(&PubkeyHash::from_byte_array([1; 20]));
        let p2wpkh = ScriptBuf::new_p2wpkh(&WPubkeyHash::from_byte_array([2; 20]));
        assert_eq!(ScriptType::from_script_buf(&p2pkh).unwrap(), ScriptType::P2PKH);
        assert_eq!(ScriptType::from_script_buf(&p2wpkh).unwrap(), ScriptType::P2WPKH);
        assert_eq!(ScriptType::P2PKH.redeem_script_size(), 108);
        assert_eq!(ScriptType::P2WPKH.redeem_script_size(), 109);
    }

    #[test]
    fn rejects_unsupported_scripts() {
        let p2sh = ScriptBuf::new_p2sh(&ScriptHash::from_byte_array([3; 20]));
        let err = SpendableUtxo::new(
            OutPoint::null(),
            TxOut { value: Amount::from_sat(1), script_pubkey: p2sh.clone() },
            Sequence::MAX,
        )
        .unwrap_err();
        match err {
            AppError::UnknownScriptType { script_hex } => assert_eq!(script_hex, p2sh.to_hex_string()),
            other => panic!("unexpected error: {other}"),
        }
    }
}
