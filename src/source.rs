use bitcoin::{Address, Amount, ScriptBuf, TxIn, Witness};

use crate::error::AppError;
use crate::types::SpendableUtxo;

/// これまでに集めた入力の累積情報。fetch のたびに新しく作られる。
#[derive(Debug, Clone, PartialEq)]
pub struct InputDetail {
    pub total: Amount,
    pub inputs: Vec<TxIn>,
    pub prev_scripts: Vec<ScriptBuf>,
    pub redeem_script_sizes: Vec<usize>,
}

/// 目標額に届くまで (または使える出力が尽きるまで) 入力を集める。
///
/// 結果は累積で、前回より少なくなることはない。目標に届かなくてもエラーには
/// せず、集められた分だけを返す。
pub trait InputSource {
    fn fetch(&mut self, target: Amount) -> Result<InputDetail, AppError>;
}

/// おつり出力のロックスクリプトを提供する。
pub trait ChangeSource {
    /// script() が返すスクリプトの長さ。スクリプトを生成せずに得られる
    fn script_size(&self) -> usize;

    fn script(&mut self) -> Result<ScriptBuf, AppError>;
}

/// UTXOを先頭から順に消費するカーソル。位置と累計額を保持する。
#[derive(Debug)]
pub struct UtxoCursor {
    utxos: Vec<SpendableUtxo>,
    position: usize,
    total: Amount,
}

impl UtxoCursor {
    pub fn new(utxos: Vec<SpendableUtxo>) -> Self {
        UtxoCursor { utxos, position: 0, total: Amount::ZERO }
    }

    pub fn total(&self) -> Amount {
        self.total
    }

    pub fn remaining(&self) -> usize {
        self.utxos.len() - self.position
    }

    pub fn advance_to(&mut self, target: Amount) -> Result<InputDetail, AppError> {
        while self.total < target && self.position < self.utxos.len() {
            let utxo = &self.utxos[self.position];
            self.total = self.total.checked_add(utxo.value()).ok_or(AppError::AmountOverflow)?;
            self.position += 1;
            log::debug!("UTXO選択: {} value={} 累計={}",
                utxo.out_point, utxo.value().to_sat(), self.total.to_sat());
        }

        let selected = &self.utxos[..self.position];
        Ok(InputDetail {
            total: self.total,
            inputs: selected.iter().map(|u| TxIn {
                previous_output: u.out_point,
                script_sig: ScriptBuf::new(), // 署名前は空
                sequence: u.sequence,
                witness: Witness::new(),
            }).collect(),
            prev_scripts: selected.iter().map(|u| u.tx_out.script_pubkey.clone()).collect(),
            redeem_script_sizes: selected.iter().map(|u| u.script_type.redeem_script_size()).collect(),
        })
    }
}

impl InputSource for UtxoCursor {
    fn fetch(&mut self, target: Amount) -> Result<InputDetail, AppError> {
        self.advance_to(target)
    }
}

/// 固定のおつりアドレスを使う ChangeSource
#[derive(Debug, Clone)]
pub struct AddressChangeSource {
    address: Address,
}

impl AddressChangeSource {
    pub fn new(address: Address) -> Self {
        AddressChangeSource { address }
    }
}

impl ChangeSource for AddressChangeSource {
    fn script_size(&self) -> usize {
        self.address.script_pubkey().len()
    }

    fn script(&mut self) -> Result<ScriptBuf, AppError> {
        Ok(self.address.script_pubkey())
    }
}
