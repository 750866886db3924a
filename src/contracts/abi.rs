use serde_json::{json, Value};

use crate::internal::helper::keccak256;
use crate::types::{Address, SecretHash};

// ============================================================================
// HTLC CONTRACT ABI
// ============================================================================

pub const FUND_SIGNATURE: &str = "fund(bytes32,address,address,uint256)";
pub const WITHDRAW_SIGNATURE: &str = "withdraw(bytes32,string)";
pub const REFUND_SIGNATURE: &str = "refund(bytes32)";

const WORD: usize = 32;

/// First four bytes of keccak256 of the canonical function signature.
pub fn function_selector(signature: &str) -> [u8; 4] {
    let hash = keccak256(signature.as_bytes());
    [hash[0], hash[1], hash[2], hash[3]]
}

fn address_word(address: &Address) -> [u8; WORD] {
    let mut word = [0u8; WORD];
    word[12..].copy_from_slice(address.as_bytes());
    word
}

fn uint_word(value: u64) -> [u8; WORD] {
    let mut word = [0u8; WORD];
    word[24..].copy_from_slice(&value.to_be_bytes());
    word
}

/// Arguments of a `fund` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FundCall {
    pub secret_hash: SecretHash,
    pub recipient: Address,
    pub sender: Address,
    pub endtime: u64,
}

impl FundCall {
    /// ABI calldata: selector followed by four static words.
    pub fn encode(&self) -> Vec<u8> {
        let mut data = Vec::with_capacity(4 + 4 * WORD);
        data.extend_from_slice(&function_selector(FUND_SIGNATURE));
        data.extend_from_slice(self.secret_hash.as_bytes());
        data.extend_from_slice(&address_word(&self.recipient));
        data.extend_from_slice(&address_word(&self.sender));
        data.extend_from_slice(&uint_word(self.endtime));
        data
    }

    /// Strict inverse of [`FundCall::encode`]; `None` for any other calldata.
    pub fn decode(data: &[u8]) -> Option<Self> {
        if data.len() != 4 + 4 * WORD || data[..4] != function_selector(FUND_SIGNATURE) {
            return None;
        }
        let words: Vec<&[u8]> = data[4..].chunks(WORD).collect();

        let address_from = |word: &[u8]| -> Option<Address> {
            if word[..12].iter().any(|b| *b != 0) {
                return None;
            }
            let mut bytes = [0u8; 20];
            bytes.copy_from_slice(&word[12..]);
            Some(Address(bytes))
        };
        if words[3][..24].iter().any(|b| *b != 0) {
            return None;
        }
        let mut endtime = [0u8; 8];
        endtime.copy_from_slice(&words[3][24..]);

        Some(FundCall {
            secret_hash: SecretHash::from_slice(words[0]).ok()?,
            recipient: address_from(words[1])?,
            sender: address_from(words[2])?,
            endtime: u64::from_be_bytes(endtime),
        })
    }
}

// ============================================================================
// HTLC CONTRACT CODE
// ============================================================================
// Storage is keyed by the locked contract id: id -> secret hash, id + 1 ->
// recipient, id + 2 -> sender, id + 3 -> endtime, id + 4 -> amount and
// id + 5 -> status (0 empty, 1 funded, 2 withdrawn, 3 refunded). The id is
// computed on chain through the sha256 precompile.

/// Creation code of the HTLC contract: constructor followed by the runtime.
pub const HTLC_BYTECODE: &str = concat!(
    "0x",
    "608060405234801561001057600080fd5b506101ad806100206000396000f3fe6080604052600436",
    "106100345760003560e01c8063f4fd30621461003957806306a53665146100d45780637249fbb614",
    "61015b575b600080fd5b5060843610610034573415610034576064354210156100345760243560a0",
    "1c6100345760443560a01c6100345760043560805260243560601b60a05260443560601b60b45260",
    "643560c852602060006068608060025afa1561003457600051806005015461003457600435815560",
    "24358160010155604435816002015560643581600301553481600401556001816005015560005260",
    "206000f35b5034610034576044361061003457600435806005015460011415610034578060030154",
    "4210156100345760243560040180358036106100345780826020016080376020600082608060025a",
    "fa156100345750506000518154141561003457600281600501556000808080846004015485600101",
    "545af1156100345750600160005260206000f35b5034610034576024361061003457600435806005",
    "01546001141561003457806003015442106100345760038160050155600080808084600401548560",
    "0201545af1156100345750600160005260206000f3",
);

/// Code left at the contract address after deployment.
pub const HTLC_BYTECODE_RUNTIME: &str = concat!(
    "0x",
    "6080604052600436106100345760003560e01c8063f4fd30621461003957806306a53665146100d4",
    "5780637249fbb61461015b575b600080fd5b50608436106100345734156100345760643542101561",
    "00345760243560a01c6100345760443560a01c6100345760043560805260243560601b60a0526044",
    "3560601b60b45260643560c852602060006068608060025afa156100345760005180600501546100",
    "34576004358155602435816001015560443581600201556064358160030155348160040155600181",
    "6005015560005260206000f35b503461003457604436106100345760043580600501546001141561",
    "00345780600301544210156100345760243560040180358036106100345780826020016080376020",
    "600082608060025afa15610034575050600051815414156100345760028160050155600080808084",
    "6004015485600101545af1156100345750600160005260206000f35b503461003457602436106100",
    "34576004358060050154600114156100345780600301544210610034576003816005015560008080",
    "80846004015485600201545af1156100345750600160005260206000f3",
);

/// JSON ABI of the HTLC contract functions this crate interacts with.
pub fn htlc_abi() -> Value {
    json!([
        {
            "type": "function",
            "name": "fund",
            "stateMutability": "payable",
            "inputs": [
                { "name": "secret_hash", "type": "bytes32" },
                { "name": "recipient", "type": "address" },
                { "name": "sender", "type": "address" },
                { "name": "endtime", "type": "uint256" }
            ],
            "outputs": [
                { "name": "locked_contract_id", "type": "bytes32" }
            ]
        },
        {
            "type": "function",
            "name": "withdraw",
            "stateMutability": "nonpayable",
            "inputs": [
                { "name": "locked_contract_id", "type": "bytes32" },
                { "name": "secret", "type": "string" }
            ],
            "outputs": [
                { "name": "", "type": "bool" }
            ]
        },
        {
            "type": "function",
            "name": "refund",
            "stateMutability": "nonpayable",
            "inputs": [
                { "name": "locked_contract_id", "type": "bytes32" }
            ],
            "outputs": [
                { "name": "", "type": "bool" }
            ]
        }
    ])
}
