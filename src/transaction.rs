use bitcoin::{
    absolute::LockTime, transaction::Version, Amount, ScriptBuf, Transaction, TxOut,
};
use serde::Serialize;

use crate::{
    error::AppError,
    fee::FeeRate,
    source::{ChangeSource, InputSource},
    txsizes,
};

const AUTHOR_OP: &str = "transaction::author_fee_subtracted_transaction";

/// 署名前のトランザクションと、その作成時に使った情報
#[derive(Debug, Clone, PartialEq)]
pub struct AuthoredTx {
    pub transaction: Transaction,
    pub prev_scripts: Vec<ScriptBuf>,
    pub total_input: Amount,
    pub change_index: Option<usize>,
    pub estimated_signed_serialize_size: usize,
}

impl AuthoredTx {
    /// 支払い出力の位置。おつりがあれば出力は2つなので、おつりでない方
    pub fn payment_index(&self) -> usize {
        self.change_index.map_or(0, |i| i ^ 1)
    }

    /// 入力合計から出力合計を引いた、実際に支払われる手数料
    pub fn fee(&self) -> Amount {
        let outputs = self.transaction.output.iter().map(|o| o.value).sum::<Amount>();
        self.total_input - outputs
    }

    pub fn report(&self) -> AuthoringReport {
        AuthoringReport {
            unsigned_tx_hex: bitcoin::consensus::encode::serialize_hex(&self.transaction),
            change_index: self.change_index,
            payment_index: self.payment_index(),
            estimated_signed_serialize_size: self.estimated_signed_serialize_size,
            fee_sats: self.fee().to_sat(),
            total_input_sats: self.total_input.to_sat(),
            prev_scripts_hex: self.prev_scripts.iter().map(|s| s.to_hex_string()).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthoringReport {
    pub unsigned_tx_hex: String,
    pub change_index: Option<usize>,
    pub payment_index: usize,
    pub estimated_signed_serialize_size: usize,
    pub fee_sats: u64,
    pub total_input_sats: u64,
    pub prev_scripts_hex: Vec<String>,
}

/// 支払い出力から手数料を差し引く形で、署名前のトランザクションを作る。
///
/// サイズ推定は常におつり出力がある前提で一度だけ行い、おつりが不要と
/// 分かっても再推定しない。おつりは集めた入力と元の支払額の差額で、
/// 手数料は支払い出力だけが負担する。少額のおつりも省略しない。
pub fn author_fee_subtracted_transaction<I, C>(
    payment: &TxOut,
    fee_rate: FeeRate,
    input_source: &mut I,
    change_source: &mut C,
) -> Result<AuthoredTx, AppError>
where
    I: InputSource + ?Sized,
    C: ChangeSource + ?Sized,
{
    let target = payment.value;
    let input_detail = input_source.fetch(target).map_err(|e| e.with_op(AUTHOR_OP))?;
    if input_detail.total < target {
        return Err(AppError::InsufficientBalance {
            available: input_detail.total.to_sat(),
            required: target.to_sat(),
            fee: 0, // サイズ推定前なので未確定
        });
    }

    let estimated_size = txsizes::estimate_serialize_size(
        &input_detail.redeem_script_sizes,
        &[payment.script_pubkey.len(), change_source.script_size()],
    );
    let fee = fee_rate.fee(estimated_size);
    log::debug!("推定サイズ: {} bytes, 手数料率: {} sats/kvB, 手数料: {} sats",
        estimated_size, fee_rate.to_sat_per_kvb(), fee.to_sat());

    let payment_value = target.checked_sub(fee).ok_or(AppError::InsufficientBalance {
        available: input_detail.total.to_sat(),
        required: target.to_sat(),
        fee: fee.to_sat(),
    })?;

    let mut outputs = vec![TxOut {
        value: payment_value,
        script_pubkey: payment.script_pubkey.clone(),
    }];

    let change_value = input_detail.total - target;
    let mut change_index = None;
    if change_value > Amount::ZERO {
        let change_script = change_source.script().map_err(|e| e.with_op(AUTHOR_OP))?;
        log::debug!("おつり出力を追加: {} sats", change_value.to_sat());
        change_index = Some(outputs.len());
        outputs.push(TxOut {
            value: change_value,
            script_pubkey: change_script,
        });
    }

    let transaction = Transaction {
        version: Version::TWO,
        lock_time: LockTime::ZERO,
        input: input_detail.inputs,
        output: outputs,
    };

    Ok(AuthoredTx {
        transaction,
        prev_scripts: input_detail.prev_scripts,
        total_input: input_detail.total,
        change_index,
        estimated_signed_serialize_size: estimated_size,
    })
}
