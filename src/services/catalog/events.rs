use rand::rngs::StdRng;
use rand::Rng;

use crate::types::Ticker::{self, *};
use crate::types::{DrawFn, EffectSpec, EventDefinition};

fn round3(x: f64) -> f64 {
    (x * 1000.0).round() / 1000.0
}

/// Analyst rating change: uniform in [-0.04, 0.04), three decimals.
pub fn draw_rating_change(rng: &mut StdRng) -> f64 {
    round3(rng.gen_range(-0.04..0.04))
}

/// Finance-ministry remark: uniform in [-0.02, 0.02), three decimals.
pub fn draw_finance_ministry_remark(rng: &mut StdRng) -> f64 {
    round3(rng.gen_range(-0.02..0.02))
}

fn fx(ticker: Ticker, a: f64, k: f64) -> EffectSpec {
    EffectSpec::fixed(ticker, a, k)
}

fn rnd(ticker: Ticker, a: f64, draw: DrawFn) -> EffectSpec {
    EffectSpec::randomized(ticker, a, draw)
}

fn event(
    id: &'static str,
    name: &'static str,
    description: &'static str,
    effects: Vec<EffectSpec>,
) -> EventDefinition {
    EventDefinition {
        id,
        name,
        description,
        effects,
    }
}

/// Full event catalog. Order matters: everything after
/// `defense_budget_increase` is eligible for random injection.
pub fn builtin_events() -> Vec<EventDefinition> {
    let mof = draw_finance_ministry_remark as DrawFn;
    let rating = draw_rating_change as DrawFn;
    let equities = [Bank, Semi, Auto, Pharma, Nitori, Util, Air, Game, Eneos];

    vec![
        event(
            "pandemic_occurs",
            "Global pandemic declared",
            "Lockdowns freeze consumer spending worldwide. Airlines take the heaviest hit.",
            vec![
                fx(Bank, 2.0, -0.2),
                fx(Air, 3.0, -0.4),
                fx(Auto, 2.0, -0.25),
                fx(Pharma, 2.0, -0.1),
                fx(Nitori, 2.0, -0.1),
                fx(Util, 2.0, -0.05),
                fx(Game, 2.0, -0.05),
            ],
        ),
        event(
            "ai_boom",
            "AI boom arrives",
            "A new AI chip launch sends global semiconductor demand soaring.",
            vec![fx(Semi, 4.0, 0.15)],
        ),
        event(
            "historic_yen_weakness",
            "Yen hits historic low",
            "Sharp currency moves give exporters a strong tailwind.",
            vec![fx(Usdjpy, 3.0, 0.1)],
        ),
        event(
            "boj_rate_hike_small",
            "BOJ raises rates",
            "A policy shift lifts hopes for wider bank lending margins.",
            vec![fx(Bank, 3.0, 0.08), fx(Usdjpy, 3.0, -0.08)],
        ),
        event(
            "mof_verbal_intervention_1",
            "Finance minister: rapid yen weakness is undesirable",
            "A warning shot at the currency market briefly triggers yen buying.",
            vec![rnd(Usdjpy, 1.0, mof)],
        ),
        event(
            "mof_verbal_intervention_2",
            "Finance minister says they are watching FX closely",
            "A textbook verbal intervention with almost no market impact.",
            vec![rnd(Usdjpy, 1.0, mof)],
        ),
        event(
            "mof_verbal_intervention_3",
            "Finance minister: will respond appropriately if needed",
            "Traders start pricing the chance of real intervention and buy yen.",
            vec![rnd(Usdjpy, 1.0, mof)],
        ),
        event(
            "mof_verbal_intervention_4",
            "Finance minister: FX should reflect fundamentals",
            "A generic remark the market reads as saying nothing at all.",
            vec![rnd(Usdjpy, 1.0, mof)],
        ),
        event(
            "mof_verbal_intervention_5",
            "Finance minister warns against speculative moves",
            "No concrete measures offered; the market shrugs it off as routine.",
            vec![rnd(Usdjpy, 1.0, mof)],
        ),
        event(
            "mof_verbal_intervention_6",
            "Finance minister 'concerned' by sudden FX swings",
            "Some speculators buy yen, but real demand pulls the pair straight back.",
            vec![rnd(Usdjpy, 1.0, mof)],
        ),
        event(
            "inbound_tourism_boom",
            "Inbound tourism booms",
            "Visitor arrivals hit a record high and airline shares rally.",
            vec![fx(Air, 3.0, 0.12)],
        ),
        event(
            "middle_east_tension",
            "Middle East tensions escalate",
            "Supply fears lift crude and send investors toward gold.",
            vec![fx(Eneos, 2.0, 0.1), fx(Gold, 2.0, 0.1)],
        ),
        event(
            "opec_plus_cuts_extended",
            "OPEC+ extends output cuts",
            "Tighter supply supports refiner earnings.",
            vec![fx(Eneos, 2.0, 0.15)],
        ),
        event(
            "mof_yen_intervention",
            "Ministry of Finance buys yen",
            "Actual intervention drives a sharp yen rally.",
            vec![fx(Usdjpy, 1.0, -0.4)],
        ),
        event(
            "boj_surprise_rate_hike",
            "BOJ surprises with a rate hike",
            "Banks jump on the prospect of better net interest margins.",
            vec![fx(Bank, 2.0, 0.18)],
        ),
        event(
            "large_loan_default",
            "Major borrower defaults",
            "A large corporate default raises credit cost fears at the banks.",
            vec![fx(Bank, 1.0, -0.22)],
        ),
        event(
            "nintendo_buyback_dividend",
            "Game maker announces buyback and dividend hike",
            "Shareholder returns are raised on both fronts at once.",
            vec![fx(Game, 2.0, 0.1)],
        ),
        event(
            "china_export_restrictions_semi",
            "Export controls on China widened to chips",
            "Chipmakers lose access to a key market.",
            vec![fx(Semi, 3.0, -0.22)],
        ),
        event(
            "generative_ai_demand_semi",
            "Generative AI drives record equipment orders",
            "Order books for chip equipment reach an all-time high.",
            vec![fx(Semi, 3.0, 0.2)],
        ),
        event(
            "semi_inventory_worsens",
            "Chip inventories pile up, lines halted",
            "Excess stock forces some production lines to stop shipping.",
            vec![fx(Semi, 2.0, -0.25)],
        ),
        event(
            "eu_ev_subsidy_cut",
            "EU scales back EV subsidies",
            "Hybrid makers gain ground as electric rivals lose support.",
            vec![fx(Auto, 3.0, 0.1)],
        ),
        event(
            "prius_recall_us",
            "Large hybrid recall in the US",
            "A major recall hits the automaker's flagship model.",
            vec![fx(Auto, 2.0, -0.3)],
        ),
        event(
            "auto_sales_improve_na",
            "North American car sales and margins improve",
            "New models sell well with better profitability.",
            vec![fx(Auto, 2.0, 0.12)],
        ),
        event(
            "pharma_phase3_success",
            "Phase 3 trial meets primary endpoint",
            "A late-stage success clears the path to approval.",
            vec![fx(Pharma, 3.0, 0.28)],
        ),
        event(
            "pharma_phase3_failure",
            "Phase 3 trial fails",
            "The lead candidate misses its primary endpoint.",
            vec![fx(Pharma, 2.0, -0.35)],
        ),
        event(
            "drug_price_revision_negative",
            "Deeper cuts in drug price revision",
            "Regulated price cuts squeeze pharmaceutical margins.",
            vec![fx(Pharma, 2.0, -0.15)],
        ),
        event(
            "new_drug_approval_fast_track",
            "Breakthrough drug review fast-tracked",
            "Regulators accelerate approval for a novel treatment.",
            vec![fx(Pharma, 2.0, 0.14)],
        ),
        event(
            "nitori_overseas_costs",
            "Retailer's overseas launch costs front-loaded",
            "New store openings abroad weigh on near-term profit.",
            vec![fx(Nitori, 2.0, -0.12)],
        ),
        event(
            "nitori_same_store_sales_up",
            "Retailer same-store sales climb",
            "Both traffic and spend per customer are up.",
            vec![fx(Nitori, 2.0, 0.12)],
        ),
        event(
            "us_jobs_report_strong",
            "US jobs report surprises to the upside",
            "Strong payrolls push the dollar higher.",
            vec![fx(Usdjpy, 1.0, 0.2)],
        ),
        event(
            "nuclear_plant_restart",
            "Nuclear plant restart approved",
            "Lower fuel costs ahead for power utilities.",
            vec![fx(Util, 3.0, 0.15)],
        ),
        event(
            "earnings_surprise_positive_auto",
            "Automaker raises guidance on earnings",
            "A surprise upward revision lifts the sector.",
            vec![fx(Auto, 2.0, 0.18)],
        ),
        event(
            "earnings_shock_negative_semi",
            "Chipmaker misses, shares sold off",
            "Disappointing results trigger a wave of selling.",
            vec![fx(Semi, 2.0, -0.2)],
        ),
        event(
            "earnings_record_profit_bank",
            "Megabank posts record profit",
            "Earnings beat on higher lending income.",
            vec![fx(Bank, 3.0, 0.15)],
        ),
        event(
            "earnings_downward_revision_nitori",
            "Retailer cuts full-year forecast",
            "Guidance revised lower on weak demand.",
            vec![fx(Nitori, 2.0, -0.15)],
        ),
        event(
            "ma_announcement_pharma",
            "Drugmaker to acquire US biotech",
            "The deal broadens the development pipeline.",
            vec![fx(Pharma, 4.0, 0.12)],
        ),
        event(
            "scandal_data_leak_util",
            "Customer data leak at power company",
            "A breach of customer records damages trust.",
            vec![fx(Util, 2.0, -0.18)],
        ),
        event(
            "scandal_inspection_fraud_auto",
            "Automaker inspection data fraud uncovered",
            "Falsified test data leads to shipment halts.",
            vec![fx(Auto, 2.0, -0.3)],
        ),
        event(
            "strategic_partnership_game_ai",
            "Game maker forms capital tie-up with AI firm",
            "The partnership lifts the game maker and its chip suppliers.",
            vec![fx(Game, 3.0, 0.15), fx(Semi, 2.0, 0.05)],
        ),
        event(
            "oil_field_discovery",
            "Refiner acquires stake in new oil field",
            "Upstream rights add to long-term earnings.",
            vec![fx(Eneos, 3.0, 0.12)],
        ),
        event(
            "typhoon_damage_factory",
            "Typhoon shuts domestic factories",
            "Production halts ripple through manufacturing and power.",
            vec![
                fx(Auto, 2.0, -0.12),
                fx(Semi, 2.0, -0.1),
                fx(Util, 2.0, -0.05),
            ],
        ),
        event(
            "earnings_season_eps_up",
            "Earnings season brings wave of EPS upgrades",
            "Broad upward revisions lift the whole market.",
            vec![fx(Nikkei, 2.0, 0.12)],
        ),
        event(
            "airline_slots_expanded",
            "International landing slots expanded",
            "More routes open up for the airline.",
            vec![fx(Air, 2.0, 0.14)],
        ),
        event(
            "fuel_surcharge_hike",
            "Fuel surcharges rise",
            "Higher fares threaten passenger demand.",
            vec![fx(Air, 2.0, -0.1)],
        ),
        event(
            "airline_staff_shortage",
            "Airline cuts flights over staff shortage",
            "Some routes are suspended for lack of crew.",
            vec![fx(Air, 1.0, -0.12)],
        ),
        event(
            "nintendo_new_hardware",
            "Game maker unveils new console",
            "The next hardware generation is officially announced.",
            vec![fx(Game, 3.0, 0.2)],
        ),
        event(
            "game_delay_major_title",
            "Major title for new console delayed",
            "The most anticipated launch slips to a later date.",
            vec![fx(Game, 2.0, -0.15)],
        ),
        event(
            "geopolitical_risk_surges_gold",
            "Geopolitical risk spikes",
            "Safe-haven demand sends gold sharply higher.",
            vec![fx(Gold, 1.0, 0.22)],
        ),
        event(
            "real_interest_rates_up_gold",
            "Real interest rates climb",
            "Holding non-yielding gold becomes more costly.",
            vec![fx(Gold, 3.0, -0.18)],
        ),
        event(
            "semi_factory_utilization_low",
            "Chip fab utilization falls to 30%",
            "Idle capacity signals a deep downturn in demand.",
            vec![fx(Semi, 5.0, -0.3)],
        ),
        event(
            "new_drug_approval_venture",
            "New drug approved",
            "A novel therapy wins approval.",
            vec![fx(Pharma, 3.0, 0.2)],
        ),
        event(
            "pokemon_new_title_sales_good",
            "New monster-catching title sells strongly",
            "Launch sales beat expectations.",
            vec![fx(Game, 3.0, 0.1)],
        ),
        event(
            "heatwave_power_shortage",
            "Heatwave strains power supply",
            "Record demand lifts wholesale electricity prices.",
            vec![fx(Util, 3.0, 0.1)],
        ),
        event(
            "us_cpi_surprise_high",
            "US CPI far above forecast",
            "Hot inflation lifts the dollar and yields while gold slips.",
            vec![
                fx(Usdjpy, 1.0, 0.18),
                fx(Bank, 2.0, 0.12),
                fx(Gold, 3.0, -0.12),
            ],
        ),
        event(
            "us_recession_official",
            "US officially declared in recession",
            "Risk assets fall as investors flee to gold and the yen.",
            vec![
                fx(Bank, 3.0, -0.25),
                fx(Air, 3.0, -0.18),
                fx(Gold, 3.0, 0.18),
                fx(Usdjpy, 2.0, -0.2),
            ],
        ),
        event(
            "middle_east_conflict_oil_spike",
            "Middle East conflict sends oil soaring",
            "Crude spikes; airlines suffer while gold rallies.",
            vec![
                fx(Eneos, 1.0, 0.2),
                fx(Air, 1.0, -0.2),
                fx(Gold, 1.0, 0.15),
            ],
        ),
        event(
            "yen_flash_crash_up",
            "Yen flash rally",
            "A sudden yen spike hammers exporters.",
            vec![
                fx(Usdjpy, 1.0, -0.35),
                fx(Auto, 1.0, -0.2),
                fx(Semi, 1.0, -0.1),
                fx(Game, 1.0, -0.12),
            ],
        ),
        event(
            "heatwave_power_demand_tight",
            "Heatwave tightens power supply and demand",
            "Utilities and fuel suppliers benefit from peak load.",
            vec![fx(Util, 2.0, 0.18), fx(Eneos, 2.0, 0.1)],
        ),
        event(
            "consumption_tax_hike_announced",
            "Government signals consumption tax hike",
            "Consumer-facing sectors brace for weaker spending.",
            vec![
                fx(Nitori, 3.0, -0.12),
                fx(Auto, 3.0, -0.15),
                fx(Air, 2.0, -0.08),
            ],
        ),
        event(
            "semi_subsidy_package",
            "Chip subsidy and deregulation package",
            "Government support lifts chips and related sectors.",
            vec![
                fx(Semi, 4.0, 0.22),
                fx(Auto, 2.0, 0.06),
                fx(Usdjpy, 1.0, 0.06),
            ],
        ),
        event(
            "boj_easing_strengthened_qe",
            "BOJ steps up easing",
            "Renewed QE weakens the yen and squeezes bank margins.",
            vec![
                fx(Usdjpy, 1.0, 0.18),
                fx(Bank, 2.0, -0.15),
                fx(Gold, 2.0, 0.1),
            ],
        ),
        event(
            "boj_rate_hike_17years",
            "BOJ hikes rates",
            "The first hike in years strengthens the yen and lifts banks.",
            vec![fx(Usdjpy, 2.0, -0.25), fx(Bank, 2.0, 0.25)],
        ),
        event(
            "tariff_hike_us_president",
            "Sweeping tariff hike",
            "New tariffs hit every listed equity.",
            equities.iter().map(|t| fx(*t, 3.0, -0.4)).collect(),
        ),
        event(
            "swiss_bank_credit_fears_1",
            "Credit fears at major Swiss bank",
            "Counterparty worries spread to banks; gold bid.",
            vec![fx(Gold, 2.0, 0.2), fx(Bank, 2.0, -0.1)],
        ),
        event(
            "swiss_bank_credit_fears_2_resolved",
            "Swiss bank credit fears dispelled",
            "A rescue calms markets and banks rebound.",
            vec![fx(Gold, 2.0, -0.02), fx(Bank, 2.0, 0.3)],
        ),
        event(
            "swiss_bank_credit_fears_3_collapse",
            "Major Swiss bank collapses",
            "Contagion fears crush bank shares.",
            vec![fx(Gold, 2.0, 0.2), fx(Bank, 2.0, -0.5)],
        ),
        event(
            "lower_house_dissolution_election",
            "Lower house dissolved, snap election called",
            "Political uncertainty weighs on the market.",
            vec![
                fx(Nikkei, 3.0, -0.12),
                fx(Bank, 2.0, -0.05),
                fx(Auto, 2.0, -0.12),
            ],
        ),
        event(
            "new_cabinet_fiscal_stimulus",
            "New cabinet unveils fiscal stimulus",
            "Expansionary policy lifts domestic demand plays.",
            vec![
                fx(Nikkei, 3.0, 0.12),
                fx(Nitori, 2.0, 0.15),
                fx(Bank, 2.0, 0.05),
            ],
        ),
        event(
            "income_tax_cut_consideration",
            "Government weighs income tax cut",
            "Consumers may have more to spend.",
            vec![fx(Nitori, 2.0, 0.14), fx(Auto, 2.0, 0.12)],
        ),
        event(
            "defense_budget_increase",
            "Government plans large defense budget increase",
            "Higher spending lifts rate expectations and the dollar.",
            vec![fx(Bank, 2.0, 0.1), fx(Usdjpy, 2.0, 0.08)],
        ),
        // Random pool
        event(
            "rating_bank_up",
            "Brokerage upgrades banks to buy",
            "An analyst upgrade on the banking sector.",
            vec![rnd(Bank, 1.0, rating)],
        ),
        event(
            "rating_auto_down",
            "Foreign broker turns bearish on autos",
            "An analyst downgrade on automakers.",
            vec![rnd(Auto, 1.0, rating)],
        ),
        event(
            "rating_semi_up",
            "Chipmaker raised to strong buy",
            "An analyst upgrade on semiconductors.",
            vec![rnd(Semi, 1.0, rating)],
        ),
        event(
            "rating_game_up",
            "Game stocks upgraded from neutral to buy",
            "An analyst upgrade on the game maker.",
            vec![rnd(Game, 1.0, rating)],
        ),
        event(
            "rating_eneos_down",
            "Oil stocks cut to bearish",
            "An analyst downgrade on the refiner.",
            vec![rnd(Eneos, 1.0, rating)],
        ),
        event(
            "rating_air_up",
            "Airlines raised to buy on demand recovery",
            "An analyst upgrade on the airline.",
            vec![rnd(Air, 1.0, rating)],
        ),
        event(
            "rating_util_down",
            "Utilities downgraded to bearish",
            "An analyst downgrade on power utilities.",
            vec![rnd(Util, 1.0, rating)],
        ),
        event(
            "rating_nitori_up",
            "Retail stocks upgraded to buy",
            "An analyst upgrade on the retailer.",
            vec![rnd(Nitori, 1.0, rating)],
        ),
        event(
            "rating_pharma_down",
            "Pharma cut to bearish on price revision risk",
            "An analyst downgrade on drugmakers.",
            vec![rnd(Pharma, 1.0, rating)],
        ),
        event(
            "rating_gold_up",
            "Gold raised to buy on safe-haven demand",
            "An analyst upgrade on gold.",
            vec![rnd(Gold, 1.0, rating)],
        ),
        event(
            "rating_usdjpy_up",
            "Report calling for further yen weakness goes viral",
            "A bank research note on the dollar-yen outlook.",
            vec![rnd(Usdjpy, 1.0, rating)],
        ),
        event(
            "rating_nikkei_up",
            "Japanese equities raised to overweight",
            "A global strategist upgrade on the whole market.",
            vec![rnd(Nikkei, 1.0, rating)],
        ),
        event(
            "algae_fuel_discovery",
            "Algae-based oil substitute discovered",
            "A potential alternative fuel source weighs on refiners.",
            vec![fx(Eneos, 3.0, -0.05)],
        ),
        event(
            "ufo_sighting_tokyo_bay",
            "UFO sighted over Tokyo Bay",
            "Markets wobble briefly on the strange report.",
            vec![
                fx(Bank, 1.0, -0.02),
                fx(Game, 1.0, 0.02),
                fx(Gold, 1.0, 0.03),
                fx(Semi, 1.0, -0.01),
            ],
        ),
        event(
            "antarctica_virus_detected",
            "Unknown virus detected in Antarctica",
            "Research bodies raise their alert level; drugmakers rally.",
            vec![fx(Pharma, 3.0, 0.28)],
        ),
        event(
            "buffett_japan_undervalued",
            "Famed investor calls Japanese stocks undervalued",
            "Banks lead a rally on the endorsement.",
            vec![fx(Bank, 3.0, 0.15)],
        ),
        event(
            "us_president_ai_semi_deregulation",
            "US president hints at AI and chip deregulation",
            "Lighter rules would boost chip demand.",
            vec![fx(Semi, 2.0, 0.12)],
        ),
        event(
            "china_stimulus_package",
            "China announces major stimulus",
            "Exporters to China rally on demand hopes.",
            vec![fx(Auto, 2.0, 0.1), fx(Semi, 2.0, 0.08)],
        ),
        event(
            "gold_meteorite_crash",
            "Meteorite packed with gold lands on Earth",
            "A sudden jump in supply sinks the gold price.",
            vec![fx(Gold, 3.0, -0.35)],
        ),
        event(
            "ai_market_prediction_rumor",
            "Rumor spreads that AI can predict the market",
            "Speculative buying spills into AI-linked names.",
            vec![fx(Game, 2.0, 0.04), fx(Semi, 2.0, 0.04)],
        ),
    ]
}
