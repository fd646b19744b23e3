use crate::cli::DescribeArgs;
use crate::error::Result;
use serde::Serialize;
use theseus::core::descriptors::{self, Descriptors};
use theseus::core::io::smiles::SmilesAdapter;
use theseus::core::io::traits::StructureAdapter;
use theseus::core::scoring::{self, FitnessResult, FitnessWeights};
use theseus::engine::error::EngineError;
use tracing::info;

#[derive(Debug, Serialize)]
struct DescribeRecord {
    input: String,
    canonical: String,
    descriptors: Descriptors,
    fitness: FitnessResult,
}

pub async fn run(args: DescribeArgs) -> Result<()> {
    let adapter = SmilesAdapter::new(args.max_fragments);
    let records = describe_all(&adapter, &args.structures)?;
    info!("Described {} structure(s).", records.len());

    if args.json {
        println!("{}", serde_json::to_string_pretty(&records)?);
    } else {
        for record in &records {
            println!("{}", render(record));
        }
    }
    Ok(())
}

fn describe_all(adapter: &SmilesAdapter, structures: &[String]) -> Result<Vec<DescribeRecord>> {
    let weights = FitnessWeights::default();
    structures
        .iter()
        .map(|input| {
            let molecule = adapter.parse(input).map_err(EngineError::from)?;
            let descriptors = descriptors::describe(&molecule);
            let fitness = scoring::score(&descriptors, &weights);
            Ok(DescribeRecord {
                input: input.clone(),
                canonical: adapter.canonicalize(&molecule),
                descriptors,
                fitness,
            })
        })
        .collect()
}

fn optional(value: Option<f64>, precision: usize) -> String {
    value.map_or_else(|| "n/a".to_string(), |v| format!("{v:.precision$}"))
}

fn yes_no(flag: bool) -> &'static str {
    if flag { "yes" } else { "no" }
}

fn render(record: &DescribeRecord) -> String {
    let d = &record.descriptors;
    let f = &record.fitness;
    format!(
        "{canonical}\n\
         \x20 formula          {formula}\n\
         \x20 MW               {mw:.2}\n\
         \x20 logP             {logp}\n\
         \x20 TPSA             {tpsa}\n\
         \x20 HBD / HBA        {hbd} / {hba}\n\
         \x20 rotatable bonds  {rot}\n\
         \x20 heavy atoms      {heavy} ({rings} ring(s))\n\
         \x20 score            {score:.3} (confidence {confidence:.2})\n\
         \x20 rule of five     {violations} violation(s)\n\
         \x20 BBB penetrant    {bbb}\n\
         \x20 toxicity risk    {tox}\n\
         \x20 oral / GI        {oral} / {gi}\n\
         \x20 SA estimate      {sa:.2}\n",
        canonical = record.canonical,
        formula = d.formula,
        mw = d.molecular_weight,
        logp = optional(d.logp, 2),
        tpsa = optional(d.tpsa, 2),
        hbd = d.hbd,
        hba = d.hba,
        rot = d.rotatable_bonds,
        heavy = d.heavy_atom_count,
        rings = d.ring_count,
        score = f.score,
        confidence = f.confidence,
        violations = f.violations,
        bbb = yes_no(f.barrier_penetrant),
        tox = yes_no(f.toxicity_risk),
        oral = yes_no(f.oral_bioavailable),
        gi = yes_no(f.gi_absorption_high),
        sa = f.synthetic_accessibility,
    )
}
