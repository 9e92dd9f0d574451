use std::fmt::Write as _;
use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

use m68k_rs::instructions::InstrTable;
use m68k_rs::isa::m68000;
use m68k_rs::{Encoder, Expr, Fixup, Inst, M68kRegInfo, Operand, RecipeTable, Reg, SymbolTable};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Encode M68000 instructions with the m68k-rs table-driven encoder"
)]
struct Opts {
    /// Load a replacement recipe asset instead of the built-in table
    #[arg(long, value_name = "FILE", global = true)]
    recipes: Option<PathBuf>,
    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Encode a JSON instruction list and print bytes and fixups
    Encode {
        #[arg(value_name = "FILE")]
        input: PathBuf,
        #[arg(long, value_enum, default_value_t = Format::Text)]
        format: Format,
        /// Write the listing here instead of stdout
        #[arg(long, value_name = "FILE")]
        out: Option<PathBuf>,
    },
    /// List the instruction table
    Opcodes,
    /// Write the recipe table as a versioned JSON asset
    DumpRecipes {
        #[arg(long, value_name = "FILE")]
        out: Option<PathBuf>,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Format {
    Text,
    Json,
}

/// One instruction of the input document. Operands are listed in the
/// flattened order the opcode's metadata defines.
#[derive(Deserialize, Debug)]
struct InstIn {
    op: String,
    #[serde(default)]
    operands: Vec<OperandIn>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "snake_case")]
enum OperandIn {
    Reg(Reg),
    Imm(i64),
    Sym(String),
}

#[derive(Serialize)]
struct EncodedOut {
    op: String,
    offset: usize,
    bytes: String,
}

#[derive(Serialize)]
struct FixupOut {
    offset: usize,
    kind: String,
    symbol: Option<String>,
    addend: i64,
}

#[derive(Serialize)]
struct ListingOut {
    insts: Vec<EncodedOut>,
    fixups: Vec<FixupOut>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let opts = Opts::parse();
    let instrs = m68000::instr_table();
    let recipes = match &opts.recipes {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            RecipeTable::load_json(&json, &instrs)?
        }
        None => m68000::recipe_table()?,
    };

    match opts.cmd {
        Cmd::Encode { input, format, out } => {
            let json = std::fs::read_to_string(&input)
                .with_context(|| format!("reading {}", input.display()))?;
            let insts: Vec<InstIn> = serde_json::from_str(&json)?;
            let listing = encode_all(&insts, &instrs, &recipes)?;
            let text = match format {
                Format::Text => render_text(&listing),
                Format::Json => serde_json::to_string_pretty(&listing)? + "\n",
            };
            emit(out.as_deref(), &text)
        }
        Cmd::Opcodes => {
            let mut text = String::new();
            for desc in instrs.iter() {
                writeln!(
                    text,
                    "{:<10} operands: {}  slots: {:?}",
                    desc.name,
                    desc.arity(),
                    desc.slots
                )?;
            }
            emit(None, &text)
        }
        Cmd::DumpRecipes { out } => {
            let json = recipes.to_json(&instrs)? + "\n";
            emit(out.as_deref(), &json)
        }
    }
}

fn encode_all(insts: &[InstIn], instrs: &InstrTable, recipes: &RecipeTable) -> Result<ListingOut> {
    let mut syms = SymbolTable::new();
    let enc = Encoder::new(instrs, recipes, &M68kRegInfo);

    let mut listing = ListingOut {
        insts: Vec::new(),
        fixups: Vec::new(),
    };
    let mut offset = 0usize;
    for inst_in in insts {
        let desc = instrs
            .by_name(&inst_in.op)
            .ok_or_else(|| anyhow!("unknown instruction {:?}", inst_in.op))?;
        let operands = inst_in
            .operands
            .iter()
            .map(|o| match o {
                OperandIn::Reg(r) => Operand::Reg(*r),
                OperandIn::Imm(v) => Operand::Imm(*v),
                OperandIn::Sym(name) => Operand::Sym(Expr::symbol(syms.intern(name))),
            })
            .collect();

        let mut bytes = Vec::new();
        let mut fixups: Vec<Fixup> = Vec::new();
        enc.encode(&Inst::new(desc.opcode, operands), &mut bytes, &mut fixups)?;

        for f in &fixups {
            listing.fixups.push(FixupOut {
                offset: offset + f.offset as usize,
                kind: format!("{:?}", f.kind),
                symbol: f.expr.symbol.and_then(|s| syms.name(s).map(String::from)),
                addend: f.expr.addend,
            });
        }
        listing.insts.push(EncodedOut {
            op: inst_in.op.clone(),
            offset,
            bytes: hex(&bytes),
        });
        offset += bytes.len();
    }
    Ok(listing)
}

fn render_text(listing: &ListingOut) -> String {
    let mut text = String::new();
    for inst in &listing.insts {
        let _ = writeln!(text, "{:04x}: {:<24} {}", inst.offset, inst.bytes, inst.op);
    }
    for f in &listing.fixups {
        let _ = writeln!(
            text,
            "fixup @{:04x} {} {}{:+}",
            f.offset,
            f.kind,
            f.symbol.as_deref().unwrap_or("<const>"),
            f.addend
        );
    }
    text
}

fn hex(bytes: &[u8]) -> String {
    let mut s = String::with_capacity(bytes.len() * 3);
    for (i, b) in bytes.iter().enumerate() {
        if i > 0 {
            s.push(' ');
        }
        let _ = write!(s, "{b:02x}");
    }
    s
}

fn emit(out: Option<&std::path::Path>, text: &str) -> Result<()> {
    match out {
        Some(path) => {
            std::fs::write(path, text).with_context(|| format!("writing {}", path.display()))
        }
        None => {
            print!("{text}");
            Ok(())
        }
    }
}
