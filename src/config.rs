use serde::Deserialize;

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct InputConfig {
    pub network: String, // "bitcoin", "testnet", "regtest"
    pub utxos: Vec<UtxoInput>,
    pub payment: PaymentDef,
    pub fee_rate_sats_per_kvb: u64,
    pub change_address: String,
    #[serde(default)]
    pub default_sequence: Option<u32>,
}

/// 使用可能なUTXO。ファイルに書かれた順に選択される
#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct UtxoInput {
    pub txid: String,
    pub vout: u32,
    pub script_pubkey_hex: String,
    pub value_sats: u64,
    #[serde(default)]
    pub sequence: Option<u32>,
}

/// 支払い先。手数料はこの金額から差し引かれる
#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct PaymentDef {
    pub address: String,
    pub value_sats: u64,
}
