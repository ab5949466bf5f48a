//! Stage prompts for the analysis pipeline. Each stage is one
//! chat-completion round trip over the previous stage's output.

pub const SCORING_PROMPT: &str = "\
You are a senior quantitative equity analyst. For each article in the input, \
produce a detailed impact assessment:

1. Impact score (1-10): 1-3 routine news, 4-6 sector-specific, 7-8 \
market-moving, 9-10 market-wide event.
2. Affected assets: exact ticker symbols and sectors.
3. Impact timeline: immediate, short-term (1-5 days), medium-term (1-4 \
weeks), or long-term.
4. A one-sentence catalyst explanation.

Consider market cap, liquidity, and current sentiment. Keep every article's \
URL and published date attached to its assessment.";

pub const FILTER_PROMPT: &str = "\
You are an event-driven strategy researcher. From the scored articles in the \
input, keep only the actionable ones:

Include when impact score >= 7, or the affected stock has a market cap above \
$10B, or the expected move exceeds 3%.
Exclude routine earnings that meet estimates, minor corporate housekeeping, \
unverified rumors, penny stocks, and general market commentary.

Return the surviving articles with their scores, tickers, URLs, and \
published dates. Briefly justify each selection.";

pub const FORMAT_PROMPT: &str = "\
You are a data engineer preparing a machine-readable feed. Convert the \
selected articles in the input into a JSON array. Each element must have \
exactly these fields:

{
  \"title\": string,
  \"summary\": string (max 200 chars),
  \"url\": string,
  \"published_date\": \"YYYY-MM-DD\",
  \"score\": integer 1-10,
  \"tickers\": [\"AAPL\", ...]
}

Respond with the JSON array only. No prose, no markdown fences.";
