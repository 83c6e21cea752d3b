use std::fs::{self, File};
use std::io::Write;
use std::str::FromStr;
use bitcoin::{Address, Amount, Network as BitcoinNetwork, OutPoint, ScriptBuf, Sequence, TxOut, Txid};
use clap::Parser;

mod config;
mod transaction;
mod error;
mod types;
mod cli;
mod fee;
mod source;
mod txsizes;

use config::InputConfig;
use error::AppError;
use cli::{CliArgs, parse_network};
use fee::FeeRate;
use source::{AddressChangeSource, UtxoCursor};
use transaction::AuthoredTx;
use types::SpendableUtxo;

fn main() -> Result<(), AppError> {
    env_logger::init();

    let args = CliArgs::parse();
    log::info!("アプリケーションを開始します。引数: {:?}", args);

    let cli_network = parse_network(&args.network)?;
    log::info!("指定されたネットワーク: {:?}", cli_network);

    let input_file_content = fs::read_to_string(&args.input_file).map_err(|e| {
        log::error!("入力ファイルの読み込みに失敗しました: {:?}", args.input_file);
        AppError::Io(e)
    })?;

    let config: InputConfig = serde_json::from_str(&input_file_content).map_err(|e| {
        log::error!("入力JSONのパースに失敗しました。");
        AppError::JsonParse {
            file_path: args.input_file.clone(),
            source: e,
        }
    })?;
    log::debug!("入力設定ファイルのパース成功: {:?}", config);

    let authored = author_from_config(config, cli_network, args.fee_rate).map_err(|e| {
        if e.is_insufficient_balance() {
            log::error!("残高不足のためトランザクションを作成できません。UTXOを追加するか支払額を見直してください。");
        }
        e
    })?;
    log::info!("署名前トランザクションの作成に成功しました。");

    let report = authored.report();
    println!("{}", report.unsigned_tx_hex);

    let report_json = serde_json::to_string_pretty(&report).map_err(AppError::JsonSerialize)?;
    let mut output_file = File::create(&args.output_file).map_err(|e| {
        log::error!("出力ファイルの作成に失敗しました: {:?}", args.output_file);
        AppError::Io(e)
    })?;
    output_file.write_all(report_json.as_bytes()).map_err(|e| {
        log::error!("出力ファイルへの書き込みに失敗しました。");
        AppError::Io(e)
    })?;
    log::info!("レポートを {:?} に保存しました。", args.output_file);

    log::info!("処理が正常に完了しました。");
    Ok(())
}

fn author_from_config(
    config: InputConfig,
    cli_network: BitcoinNetwork,
    fee_rate_override: Option<FeeRate>,
) -> Result<AuthoredTx, AppError> {
    let config_network = parse_network(&config.network)?;
    if config_network != cli_network {
        return Err(AppError::NetworkMismatch {
            cli_network: format!("{:?}", cli_network),
            config_network: format!("{:?}", config_network),
        });
    }

    let mut utxos = Vec::with_capacity(config.utxos.len());
    for utxo_input in config.utxos.iter() {
        let txid = Txid::from_str(&utxo_input.txid)
            .map_err(|e| AppError::InputValidation(format!("無効なTXID形式 ({}): {}", utxo_input.txid, e)))?;
        let script_pubkey_bytes = hex::decode(&utxo_input.script_pubkey_hex)
            .map_err(|e| AppError::InputValidation(format!("scriptPubKeyHexのデコード失敗: {}", e)))?;

        let sequence_num = utxo_input.sequence.or(config.default_sequence).unwrap_or(Sequence::MAX.0);
        let utxo = SpendableUtxo::new(
            OutPoint::new(txid, utxo_input.vout),
            TxOut {
                value: Amount::from_sat(utxo_input.value_sats),
                script_pubkey: ScriptBuf::from_bytes(script_pubkey_bytes),
            },
            Sequence(sequence_num),
        )?;
        log::debug!("UTXO追加: txid={}, vout={}, value={}, type={:?}",
            utxo_input.txid, utxo_input.vout, utxo_input.value_sats, utxo.script_type);
        utxos.push(utxo);
    }

    let payment_address = Address::from_str(&config.payment.address)?.require_network(cli_network)?;
    let payment = TxOut {
        value: Amount::from_sat(config.payment.value_sats),
        script_pubkey: payment_address.script_pubkey(),
    };

    let change_address = Address::from_str(&config.change_address)
        .and_then(|addr| addr.require_network(cli_network))
        .map_err(|e| AppError::ChangeAddressDerivation(format!("おつりアドレス形式エラーまたはネットワーク不整合 ({}): {}", config.change_address, e)))?;

    let fee_rate = fee_rate_override.unwrap_or(FeeRate::from_sat_per_kvb(config.fee_rate_sats_per_kvb));
    if fee_rate == FeeRate::ZERO {
        log::warn!("手数料率が0です。このトランザクションはリレーされない可能性があります。");
    }

    let mut input_source = UtxoCursor::new(utxos);
    let mut change_source = AddressChangeSource::new(change_address);
    let authored = transaction::author_fee_subtracted_transaction(
        &payment,
        fee_rate,
        &mut input_source,
        &mut change_source,
    )?;
    log::info!("選択された入力: {} 個 (合計 {} sats), 未使用のUTXO: {} 個",
        authored.transaction.input.len(), input_source.total().to_sat(), input_source.remaining());

    // ダスト判定は警告のみ。出力は削らない
    for (index, output) in authored.transaction.output.iter().enumerate() {
        let dust_value = output.script_pubkey.minimal_non_dust();
        if output.value < dust_value {
            log::warn!("出力 {} の金額 {} sats はダスト閾値 {} sats 未満です。",
                index, output.value.to_sat(), dust_value.to_sat());
        }
    }

    Ok(authored)
}
