/*!

This is the long-form manual for `area_tally` and `areatally`.

## Input formats

Two files are needed: the boundaries of the regions and the survey answers.

### Boundaries

A CSV file with one row per vertex and the columns `name`, `x`, `y`:

```text
name,x,y
group_1_station,0,0
group_1_station,0,10
group_1_station,10,10
group_1_station,10,0
group_2_park,10,0
...
```

All the rows sharing a name form one polygon, with the vertices in row order.
The polygon is closed implicitly: the last vertex connects back to the first one.
A region needs at least 3 vertices.

Regions are tested in the order in which their name first appears in the file.
When regions overlap, a point is assigned to the earliest one.

### Survey answers

Each respondent can mark up to two places they like and two places they dislike.
The answers are provided with one row per respondent:

| Respondent ID | like1_x | like1_y | like2_x | like2_y | Dislike1_x | Dislike1_y | Dislike2_x | Dislike2_y |
|---------------|---------|---------|---------|---------|------------|------------|------------|------------|
| 1             | 5       | 5       |         |         | 6          | 6          |            |            |
| 2             | 5       | 5       |         |         |            |            |            |            |

Empty cells are missing marks. A mark with only one coordinate is ignored.
The `Respondent ID` column is optional. Without it, the position of the row
(starting at 0) is the identifier. Identifiers must be unique.

Supported providers:
* `csv` comma separated values with a header row
* `xlsx` an Excel workbook. If it contains more than one worksheet, the name of the
  worksheet must be given with `excelWorksheetName` (or `--excel-worksheet-name`).

## The cancellation rule

The marks of every respondent are first assigned to regions. If a respondent
placed both a like and a dislike in the same region, both are discarded for that
region: the respondent is neutral about it. Marks in other regions are not affected.

The `none` column of a region is the number of respondents minus the likes and
dislikes counted for that region. Since a respondent may place both likes in the
same region, `none` can become negative. This is reported as a warning, or as an
error with the `negativeNone: "fail"` rule.

## Configuration

```json
{
  "outputSettings": {
    "surveyName": "Station area survey",
    "outputDirectory": "out",
    "columnGroupPattern": "group_(\\d+)"
  },
  "boundarySource": { "provider": "csv", "filePath": "xy_points.csv" },
  "respondentSources": [
    { "provider": "csv", "filePath": "sample.csv", "idColumn": "Respondent ID" }
  ],
  "rules": { "cancellation": "offsetBoth", "negativeNone": "warn" }
}
```

Paths are relative to the directory of the configuration file.

## Outputs

The following files are written to the output directory:
* `area_summary.csv` the totals and ratios per region, after cancellation
* `area_count.csv` the counts per respondent and region, before cancellation
* `area_count_after.csv` the same counts after cancellation
* `area_count_diff.csv` the difference (after minus before)
* `surviving_points.csv` the coordinates that were not cancelled

The region columns of the per-respondent files are sorted by the number captured
by `columnGroupPattern`. Regions whose name does not match come last.

A JSON summary of the region totals is written to `summary.json` in the output
directory, to the file given by `summaryFile` (or `--summary`), or to the standard
output. With `--reference`, the summary is compared to a previous one and the run
fails if they differ.

*/
